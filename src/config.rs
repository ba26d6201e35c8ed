//! Run configuration: the data tables (keys, replacements, categories, rename
//! map) and page settings that parametrize a reconciliation run.
//!
//! Configuration loads from YAML with defaults for everything except the key
//! columns. `template()` emits a commented starter file, and
//! `parse_rename_rules()` understands the compact `Old->New; Old2->New2`
//! command-line syntax.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::layout::{A4, CM, LETTER, Margins, PageGeometry, WidthConstraints};

pub const DEFAULT_ORDINAL_COLUMN: &str = "Row No";
pub const DEFAULT_MARGIN_CM: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Columns whose combined values identify one logical record.
    pub key_columns: Vec<String>,
    #[serde(rename = "replace", alias = "replacements")]
    pub replacements: Vec<ReplacementRule>,
    pub category: Option<CategoryFilter>,
    pub sort: SortSpec,
    #[serde(rename = "rename", alias = "renames")]
    pub renames: Vec<RenameRule>,
    pub ordinal_column: String,
    pub collision: CollisionPolicy,
    pub page: PageSpec,
    pub widths: WidthSpec,
    pub background: Background,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            replacements: Vec::new(),
            category: None,
            sort: SortSpec::default(),
            renames: Vec::new(),
            ordinal_column: DEFAULT_ORDINAL_COLUMN.to_string(),
            collision: CollisionPolicy::default(),
            page: PageSpec::default(),
            widths: WidthSpec::default(),
            background: Background::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: RunConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(text).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_columns.is_empty() {
            return Err(anyhow!("Config must name at least one key column"));
        }
        if self.widths.min_cm <= 0.0 || self.widths.max_cm < self.widths.min_cm {
            return Err(anyhow!(
                "Column width bounds must satisfy 0 < min ({}) <= max ({})",
                self.widths.min_cm,
                self.widths.max_cm
            ));
        }
        if self.widths.char_unit <= 0.0 {
            return Err(anyhow!("Character unit width must be positive"));
        }
        let margins = &self.page.margins_cm;
        if [margins.left, margins.right, margins.top, margins.bottom]
            .iter()
            .any(|m| *m < 0.0)
        {
            return Err(anyhow!("Page margins cannot be negative"));
        }
        Ok(())
    }

    /// Commented starter config for `init-config`.
    pub fn template() -> &'static str {
        TEMPLATE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub column: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub column: String,
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    pub group_column: Option<String>,
    pub identifier_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

/// How same-named non-key columns surviving the join are disambiguated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionPolicy {
    pub mode: CollisionMode,
    pub left_tag: String,
    pub right_tag: String,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            mode: CollisionMode::TagRight,
            left_tag: "left".to_string(),
            right_tag: "right".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionMode {
    /// Left column keeps its name; the right copy gets the right tag.
    #[default]
    TagRight,
    /// Both copies get their side's tag.
    TagBoth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub size: PageSize,
    pub orientation: Orientation,
    pub margins_cm: MarginsCm,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Landscape,
            margins_cm: MarginsCm::default(),
        }
    }
}

impl PageSpec {
    pub fn geometry(&self) -> PageGeometry {
        let (width, height) = match self.size {
            PageSize::A4 => A4,
            PageSize::Letter => LETTER,
        };
        let (width, height) = match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        };
        PageGeometry {
            width,
            height,
            margins: Margins {
                left: self.margins_cm.left * CM,
                right: self.margins_cm.right * CM,
                top: self.margins_cm.top * CM,
                bottom: self.margins_cm.bottom * CM,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginsCm {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for MarginsCm {
    fn default() -> Self {
        Self {
            left: DEFAULT_MARGIN_CM,
            right: DEFAULT_MARGIN_CM,
            top: DEFAULT_MARGIN_CM,
            bottom: DEFAULT_MARGIN_CM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthSpec {
    pub min_cm: f64,
    pub max_cm: f64,
    pub char_unit: f64,
    pub padding: usize,
    pub tolerance: f64,
}

impl Default for WidthSpec {
    fn default() -> Self {
        Self {
            min_cm: 1.0,
            max_cm: 8.0,
            char_unit: 2.5,
            padding: 2,
            tolerance: 1.0,
        }
    }
}

impl WidthSpec {
    pub fn constraints(&self) -> WidthConstraints {
        WidthConstraints {
            min: self.min_cm * CM,
            max: self.max_cm * CM,
            char_unit: self.char_unit,
            padding: self.padding,
            tolerance: self.tolerance,
        }
    }
}

/// Background directive handed to the rendering collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Background {
    #[default]
    None,
    Watermark {
        text: String,
    },
    Image {
        path: PathBuf,
    },
}

/// Parses `Old->New; Old2->New2` into rename rules. Fragments without an
/// arrow are ignored, matching the interactive dialog this syntax came from.
pub fn parse_rename_rules(text: &str) -> Vec<RenameRule> {
    text.split(';')
        .filter_map(|pair| pair.split_once("->"))
        .filter_map(|(from, to)| {
            let from = from.trim();
            let to = to.trim();
            if from.is_empty() {
                None
            } else {
                Some(RenameRule {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        })
        .collect()
}

const TEMPLATE: &str = r#"# csv-reconcile run configuration.
# Columns that must agree in both inputs for two rows to be the same record.
key_columns: [Unit, Case No, Status, Type]

# Literal, case-insensitive substring replacements applied before joining.
replace:
  - column: Unit
    from: Attorney Office
    to: ABC

# Keep only rows whose category column holds one of the allowed values.
category:
  column: Type
  allowed: [Investigation, Criminal Case]

# Structured ordering: group string first, then year/sequence parsed from
# an identifier shaped like 2023/45.
sort:
  group_column: Unit
  identifier_column: Case No

# Column relabeling applied after sorting.
rename:
  - from: Status
    to: Pending

ordinal_column: Row No

# Same-named non-key columns after the join: tag-right | tag-both.
collision:
  mode: tag-right
  left_tag: left
  right_tag: right

page:
  size: a4            # a4 | letter
  orientation: landscape
  margins_cm: {left: 1.5, right: 1.5, top: 1.5, bottom: 1.5}

widths:
  min_cm: 1.0
  max_cm: 8.0
  char_unit: 2.5
  padding: 2
  tolerance: 1.0

# none, or: {kind: watermark, text: DRAFT} / {kind: image, path: seal.png}
background:
  kind: none
"#;
