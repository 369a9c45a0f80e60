// ─── Comparison Engine ───
// Three-way classification of a reference file set against a subject set
// under a caller-supplied regex blacklist.

use std::collections::HashSet;

use regex::Regex;

use crate::assets::model::AssetManifest;
use crate::catalog::model::Edition;
use crate::error::{ToolsError, ToolsResult};
use crate::pack::ResourcePack;

/// Derived per request, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    /// Reference files present in the subject.
    pub matching: Vec<String>,
    /// Reference files absent from the subject.
    pub missing: Vec<String>,
    /// Subject files absent from the reference.
    pub unused: Vec<String>,
    /// Reference files that survived exclusion filtering.
    pub total_reference: usize,
}

/// A compiled exclusion-rule set. The defaults are a starting point; the
/// active set is caller-owned and editable.
#[derive(Debug)]
pub struct ExclusionRules {
    rules: Vec<Regex>,
}

impl ExclusionRules {
    pub fn compile(patterns: &[String]) -> ToolsResult<Self> {
        let rules = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ToolsError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<ToolsResult<Vec<Regex>>>()?;
        Ok(Self { rules })
    }

    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// A file is excluded if any rule matches anywhere in its path.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(path))
    }
}

/// Classify `reference` against `subject`.
///
/// The two scans are independent set-membership passes over immutable
/// inputs; `unused` is a plain subject-minus-reference difference and does
/// not affect `total_reference`.
pub fn compare(reference: &[String], subject: &[String], rules: &ExclusionRules) -> ComparisonResult {
    let subject_set: HashSet<&str> = subject.iter().map(String::as_str).collect();
    let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();

    let mut result = ComparisonResult::default();

    for file in reference {
        if rules.is_excluded(file) {
            continue;
        }
        result.total_reference += 1;
        if subject_set.contains(file.as_str()) {
            result.matching.push(file.clone());
        } else {
            result.missing.push(file.clone());
        }
    }

    for file in subject {
        if !rules.is_excluded(file) && !reference_set.contains(file.as_str()) {
            result.unused.push(file.clone());
        }
    }

    result
}

/// Texture comparison of a pack against a reference manifest, with an
/// optional structurally identical mcmeta pass (Java only; Bedrock
/// manifests have no mcmeta set).
#[derive(Debug, Clone)]
pub struct PackComparison {
    pub textures: ComparisonResult,
    pub mc_metas: Option<ComparisonResult>,
}

pub fn compare_pack(
    manifest: &AssetManifest,
    pack: &ResourcePack,
    rules: &ExclusionRules,
    include_mcmetas: bool,
) -> PackComparison {
    let textures = compare(&manifest.textures, &pack.effective_textures(), rules);

    let mc_metas = (include_mcmetas && manifest.minecraft.edition == Edition::Java)
        .then(|| compare(&manifest.mc_metas, &pack.effective_mcmetas(), rules));

    PackComparison { textures, mc_metas }
}

/// The stock exclusion patterns for an edition: assets that vanilla ships
/// but packs are not expected to cover.
pub fn default_blacklist(edition: Edition) -> Vec<String> {
    let patterns: &[&str] = match edition {
        Edition::Java => &[
            "_MACOSX",
            "assets/minecraft/textures/ctm",
            "assets/minecraft/textures/custom",
            "textures/colormap",
            "background/panorama_overlay.png",
            "assets/minecraft/textures/environment/clouds.png",
            "assets/minecraft/textures/trims/color_palettes",
            "assets/minecraft/textures/gui/presets",
            "assets/minecraft/textures/entity/llama/spit.png",
            "assets/minecraft/textures/block/lightning_rod_on.png",
        ],
        Edition::Bedrock => &[
            "_MACOSX",
            "texts/",
            "textures/persona_thumbnails",
            "textures/colormap",
            "textures/trims/color_palettes",
            "textures/environment/clouds.png",
            "textures/environment/end_portal_colors.png",
            "textures/entity/horse/armor/horse_armor_none.png",
            "textures/entity/horse/horse_markings_none.png",
            "textures/entity/horse2/armor/horse_armor_none.png",
            "textures/entity/horse2/horse_markings_none.png",
            "textures/entity/iron_golem/cracked_none.png",
            "textures/entity/llama/decor/decor_none.png",
            "textures/entity/llama/spit.png",
            "textures/entity/lead_rope.png",
            "textures/entity/loyalty_rope.png",
            "textures/entity/cape_invisible.png",
            "textures/entity/zombie_villager2/professions/unskilled.tga",
        ],
    };
    patterns.iter().map(|p| p.to_string()).collect()
}
