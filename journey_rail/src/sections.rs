// sections.rs - Ordered chapters over the rail parameter and their environment targets

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::animation::Color;
use crate::error_handling::{Result, SceneError};
use crate::types::{EnvironmentConfig, SectionConfig};

/// Scene look a section blends toward
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Environment {
    pub background: Color,
    pub fog_color: Color,
    pub light_intensity: f32,
    pub accent: Color,
}

impl Environment {
    fn from_config(section: &str, env: &EnvironmentConfig) -> Result<Self> {
        let parse = |value: &str| {
            value.parse::<Color>().map_err(|_| SceneError::InvalidColor {
                section: section.to_string(),
                value: value.to_string(),
            })
        };
        if !env.light_intensity.is_finite() || env.light_intensity < 0.0 {
            return Err(SceneError::InvalidParameter {
                name: "lightIntensity",
                reason: format!("section '{section}' has {}", env.light_intensity),
            });
        }
        Ok(Self {
            background: parse(&env.background)?,
            fog_color: parse(&env.fog_color)?,
            light_intensity: env.light_intensity,
            accent: parse(&env.accent)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: Arc<str>,
    pub title: String,
    pub t_start: f64,
    pub t_end: f64,
    pub environment: Environment,
    pub has_panel: bool,
}

impl Section {
    pub fn from_config(config: &SectionConfig) -> Result<Self> {
        let (start, end) = (config.t_start, config.t_end);
        let well_formed = start.is_finite() && end.is_finite() && 0.0 <= start && start <= end && end <= 1.0;
        if !well_formed {
            return Err(SceneError::InvalidInterval {
                id: config.id.clone(),
                start,
                end,
            });
        }
        Ok(Self {
            id: Arc::from(config.id.as_str()),
            title: config.title.clone(),
            t_start: start,
            t_end: end,
            environment: Environment::from_config(&config.id, &config.env)?,
            has_panel: config.panel,
        })
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.t_start <= t && t <= self.t_end
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.t_start + self.t_end) / 2.0
    }
}

/// Non-empty, ordered, non-overlapping section list (edges may touch).
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn new(sections: Vec<Section>) -> Result<Self> {
        if sections.is_empty() {
            return Err(SceneError::NoSections);
        }

        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.id.clone()) {
                return Err(SceneError::DuplicateSectionId(section.id.to_string()));
            }
        }

        for pair in sections.windows(2) {
            if pair[1].t_start < pair[0].t_end {
                return Err(SceneError::OverlappingSections {
                    previous: pair[0].id.to_string(),
                    next: pair[1].id.to_string(),
                });
            }
        }

        Ok(Self { sections })
    }

    pub fn from_configs(configs: &[SectionConfig]) -> Result<Self> {
        let sections = configs.iter().map(Section::from_config).collect::<Result<Vec<_>>>()?;
        Self::new(sections)
    }

    /// First section containing `t`; gaps and anything past the authored range
    /// resolve to the last section.
    pub fn active_index_for(&self, t: f64) -> usize {
        self.sections
            .iter()
            .position(|s| s.contains(t))
            .unwrap_or(self.sections.len() - 1)
    }

    pub fn active_section_for(&self, t: f64) -> &Section {
        &self.sections[self.active_index_for(t)]
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| &*s.id == id)
    }

    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Navigation stops: the rail start, then every section midpoint in order.
    pub fn checkpoints(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.sections.iter().map(Section::midpoint))
            .collect()
    }

    /// True when the section has a panel and `progress` sits within `range` of its midpoint.
    pub fn panel_active(&self, index: usize, progress: f64, range: f64) -> bool {
        self.sections
            .get(index)
            .map(|s| s.has_panel && (progress - s.midpoint()).abs() <= range)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvironmentConfig {
        EnvironmentConfig {
            background: "#1b1e3b".into(),
            fog_color: "#0a0c1c".into(),
            light_intensity: 0.6,
            accent: "#90e0ef".into(),
        }
    }

    fn section(id: &str, t_start: f64, t_end: f64) -> SectionConfig {
        SectionConfig {
            id: id.into(),
            title: String::new(),
            t_start,
            t_end,
            env: env(),
            panel: false,
        }
    }

    fn registry() -> SectionRegistry {
        SectionRegistry::from_configs(&[
            section("projects", 0.0, 0.33),
            section("accounts", 0.33, 0.66),
            section("interests", 0.9, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_inside_sections() {
        let reg = registry();
        assert_eq!(&*reg.active_section_for(0.1).id, "projects");
        assert_eq!(&*reg.active_section_for(0.5).id, "accounts");
        assert_eq!(&*reg.active_section_for(0.95).id, "interests");
    }

    #[test]
    fn test_shared_edge_resolves_to_earlier_section() {
        assert_eq!(&*registry().active_section_for(0.33).id, "projects");
    }

    #[test]
    fn test_gap_falls_back_to_last_section() {
        let reg = registry();
        assert_eq!(&*reg.active_section_for(0.7).id, "interests");
        assert_eq!(&*reg.active_section_for(0.89).id, "interests");
    }

    #[test]
    fn test_beyond_range_falls_back_to_last_section() {
        let reg = SectionRegistry::from_configs(&[section("a", 0.0, 0.4), section("b", 0.4, 0.8)]).unwrap();
        assert_eq!(&*reg.active_section_for(0.85).id, "b");
        assert_eq!(&*reg.active_section_for(1.0).id, "b");
    }

    #[test]
    fn test_checkpoints_are_midpoints_after_zero() {
        let reg = SectionRegistry::from_configs(&[
            section("a", 0.0, 0.3),
            section("b", 0.3, 0.7),
            section("c", 0.9, 1.0),
        ])
        .unwrap();
        let cps = reg.checkpoints();
        assert_eq!(cps.len(), 4);
        assert_eq!(cps[0], 0.0);
        approx::assert_abs_diff_eq!(cps[1], 0.15, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(cps[2], 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(cps[3], 0.95, epsilon = 1e-12);
    }

    #[test]
    fn test_panel_proximity() {
        let mut with_panel = section("projects", 0.0, 0.33);
        with_panel.panel = true;
        let reg = SectionRegistry::from_configs(&[with_panel, section("accounts", 0.33, 0.66)]).unwrap();
        assert!(reg.panel_active(0, 0.165, 0.08));
        assert!(reg.panel_active(0, 0.24, 0.08));
        assert!(!reg.panel_active(0, 0.3, 0.08));
        assert!(!reg.panel_active(1, 0.495, 0.08));
        assert!(!reg.panel_active(9, 0.5, 0.08));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(SectionRegistry::new(vec![]), Err(SceneError::NoSections)));

        let inverted = SectionRegistry::from_configs(&[section("a", 0.6, 0.2)]);
        assert!(matches!(inverted, Err(SceneError::InvalidInterval { .. })));

        let outside = SectionRegistry::from_configs(&[section("a", 0.0, 1.2)]);
        assert!(matches!(outside, Err(SceneError::InvalidInterval { .. })));

        let overlap = SectionRegistry::from_configs(&[section("a", 0.0, 0.5), section("b", 0.4, 0.8)]);
        assert!(matches!(overlap, Err(SceneError::OverlappingSections { .. })));

        let dup = SectionRegistry::from_configs(&[section("a", 0.0, 0.5), section("a", 0.5, 0.8)]);
        assert!(matches!(dup, Err(SceneError::DuplicateSectionId(_))));

        let mut bad_color = section("a", 0.0, 0.5);
        bad_color.env.accent = "teal".into();
        assert!(matches!(
            SectionRegistry::from_configs(&[bad_color]),
            Err(SceneError::InvalidColor { .. })
        ));
    }
}
