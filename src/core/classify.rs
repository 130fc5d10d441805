//! Decides what happens to each scalar the walker reaches.
//!
//! Rules are evaluated in table order and the first one whose predicate
//! holds decides. Classification is pure: it reads the leaf and returns a
//! [`Classification`]; interning and dictionary writes happen in
//! [`super::extract`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::walker::{Property, parent_property};
use crate::utils::{is_numeric_like, replace_with_variables, sanitize};

// ============================================================
// Field sets
// ============================================================

/// Properties whose value is descriptive prose, interned verbatim.
pub const PHRASE_PROPERTIES: &[&str] = &[
    "abbreviation",
    "age",
    "desc",
    "full_name",
    "language_desc",
    "material",
    "name",
    "size_description",
];

/// Parent properties holding blocks of prose.
pub const PHRASE_PARENTS: &[&str] = &["desc", "from", "higher_level", "special"];

/// Properties whose value is an identifier or enum, never externalized.
pub const EXCLUDED_PROPERTIES: &[&str] = &["alignment", "attack_type", "dc_success", "index", "school"];

/// Parent properties whose children are identifiers or formulas.
pub const EXCLUDED_PARENTS: &[&str] = &[
    "components",
    "components_required",
    "damage_at_slot_level",
    "heal_at_slot_level",
];

/// Properties whose bare lowercase values are enum tags.
pub const TAG_PROPERTIES: &[&str] = &["success_type", "type"];

/// Properties holding quantities.
pub const MEASUREMENT_PROPERTIES: &[&str] = &[
    "blindsight",
    "capacity",
    "casting_time",
    "darkvision",
    "duration",
    "range",
    "size",
    "tremorsense",
    "truesight",
    "unit",
    "count",
];

/// Parent property whose children are quantities.
pub const MEASUREMENT_PARENT: &str = "speed";

/// Parent properties holding comma/"and" separated damage type lists.
pub const DAMAGE_LIST_PARENTS: &[&str] = &[
    "damage_resistances",
    "damage_vulnerabilities",
    "damage_immunities",
];

/// Property holding a comma/"and" separated language list.
pub const LANGUAGE_LIST_PROPERTY: &str = "languages";

pub const EQUIPMENT_PROPERTY_FIELDS: &[&str] = &[
    "armor_category",
    "category_range",
    "tool_category",
    "vehicle_category",
    "weapon_category",
    "weapon_range",
];

/// Properties that get a `common.<property>` bucket of their own.
pub const NAMED_BUCKET_PROPERTIES: &[&str] = &["notes", "typical_speakers", "script", "subclass_flavor"];

/// Parent property that gets a `common.<parent>` bucket of its own.
pub const NAMED_BUCKET_PARENT: &str = "typical_speakers";

/// Values of type-like fields that are identifiers rather than text.
pub const TYPE_VALUE_DENYLIST: &[&str] = &[
    "personality_traits",
    "ability-scores",
    "equipment-categories",
    "ability_bonuses",
];

// ============================================================
// Literal-format patterns
// ============================================================

static API_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/?api/").unwrap());

static DICE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]|[1-9][0-9])?d(|4|6|8|10|12|20|1)((\+|\-)([0-9]|[1-9][0-9]))??$").unwrap()
});

static BARE_IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z_-]+$").unwrap());

/// A number followed by whitespace or the end of the text. Group 1 is the number.
pub static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]*\.?[0-9]+|[0-9]{1,3}(?:,[0-9]{3})*(?:\.[0-9]+)?)(?:\s|$)").unwrap()
});

static LIST_SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r", and | and |, ").unwrap());

// ============================================================
// Decisions
// ============================================================

/// The rule that decided a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Phrase,
    Excluded,
    Measurement,
    List,
    EquipmentProperty,
    NamedBucket,
    VariousType,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Phrase => write!(f, "phrase"),
            RuleKind::Excluded => write!(f, "excluded"),
            RuleKind::Measurement => write!(f, "measurement"),
            RuleKind::List => write!(f, "list"),
            RuleKind::EquipmentProperty => write!(f, "equipment property"),
            RuleKind::NamedBucket => write!(f, "named bucket"),
            RuleKind::VariousType => write!(f, "various types"),
        }
    }
}

/// Where a list's items are interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListBucket {
    DamageTypes,
    Languages,
}

impl ListBucket {
    pub fn prefix(&self) -> &'static str {
        match self {
            ListBucket::DamageTypes => "common.damage_types",
            ListBucket::Languages => "common.languages",
        }
    }
}

/// Outcome of classifying one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Intern the whole text at the leaf's own path.
    Phrase,
    /// Leave the value as it is.
    Literal,
    /// Numbers replaced by variables; the template carries one `replace`
    /// filter per number.
    Measurement {
        path: String,
        value: String,
        numbers: Vec<String>,
    },
    /// Split into items that are interned one by one and rejoined.
    List {
        bucket: ListBucket,
        items: Vec<String>,
        has_and: bool,
        oxford_comma: bool,
    },
    /// Stored under a path derived from the text itself.
    Keyed { rule: RuleKind, path: String },
    /// A rule matched but the text sanitizes to an empty key.
    Unkeyable { rule: RuleKind },
    /// No rule matched.
    Uncategorized,
}

/// What classification needs to know about a leaf.
#[derive(Debug, Clone, Copy)]
pub struct LeafInfo<'a> {
    pub value: &'a Value,
    pub property: &'a Property,
    pub path: &'a str,
}

impl<'a> LeafInfo<'a> {
    pub fn text(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn property_name(&self) -> Option<&'a str> {
        self.property.as_key()
    }

    pub fn parent_property(&self) -> &'a str {
        parent_property(self.path)
    }

    fn property_in(&self, set: &[&str]) -> bool {
        self.property_name().is_some_and(|p| set.contains(&p))
    }

    fn parent_in(&self, set: &[&str]) -> bool {
        set.contains(&self.parent_property())
    }

    fn text_or_empty(&self) -> &'a str {
        self.text().unwrap_or_default()
    }
}

struct ClassificationRule {
    kind: RuleKind,
    applies: fn(&LeafInfo<'_>) -> bool,
    decide: fn(&LeafInfo<'_>) -> Classification,
}

/// Rules in precedence order.
static RULES: [ClassificationRule; 7] = [
    ClassificationRule {
        kind: RuleKind::Phrase,
        applies: is_phrase,
        decide: |_| Classification::Phrase,
    },
    ClassificationRule {
        kind: RuleKind::Excluded,
        applies: is_excluded,
        decide: |_| Classification::Literal,
    },
    ClassificationRule {
        kind: RuleKind::Measurement,
        applies: is_measurement,
        decide: decide_measurement,
    },
    ClassificationRule {
        kind: RuleKind::List,
        applies: is_list,
        decide: decide_list,
    },
    ClassificationRule {
        kind: RuleKind::EquipmentProperty,
        applies: is_equipment_property,
        decide: |leaf| keyed(leaf, RuleKind::EquipmentProperty, "common.equipment_properties"),
    },
    ClassificationRule {
        kind: RuleKind::NamedBucket,
        applies: is_named_bucket,
        decide: decide_named_bucket,
    },
    ClassificationRule {
        kind: RuleKind::VariousType,
        applies: is_various_type,
        decide: |leaf| keyed(leaf, RuleKind::VariousType, "common.various_types"),
    },
];

/// Classifies a leaf; the first matching rule wins.
pub fn classify(leaf: &LeafInfo<'_>) -> Classification {
    first_rule(leaf)
        .map(|rule| (rule.decide)(leaf))
        .unwrap_or(Classification::Uncategorized)
}

fn first_rule(leaf: &LeafInfo<'_>) -> Option<&'static ClassificationRule> {
    RULES.iter().find(|rule| (rule.applies)(leaf))
}

// ============================================================
// Predicates
// ============================================================

fn is_phrase(leaf: &LeafInfo<'_>) -> bool {
    leaf.text().is_some_and(|t| !t.is_empty())
        && (leaf.property_in(PHRASE_PROPERTIES) || leaf.parent_in(PHRASE_PARENTS))
}

/// Whether a string is a literal format that never gets externalized.
pub fn is_literal_format(text: &str) -> bool {
    API_PATH_REGEX.is_match(text) || DICE_REGEX.is_match(text)
}

fn is_excluded(leaf: &LeafInfo<'_>) -> bool {
    let Some(text) = leaf.text() else {
        return true;
    };

    leaf.property_in(EXCLUDED_PROPERTIES)
        || leaf.parent_in(EXCLUDED_PARENTS)
        || text.is_empty()
        || is_numeric_like(text)
        || is_literal_format(text)
        || (leaf.property_in(TAG_PROPERTIES) && BARE_IDENTIFIER_REGEX.is_match(text))
}

fn is_measurement(leaf: &LeafInfo<'_>) -> bool {
    leaf.property_in(MEASUREMENT_PROPERTIES) || leaf.parent_property() == MEASUREMENT_PARENT
}

fn is_list(leaf: &LeafInfo<'_>) -> bool {
    leaf.parent_in(DAMAGE_LIST_PARENTS) || leaf.property_name() == Some(LANGUAGE_LIST_PROPERTY)
}

fn is_equipment_property(leaf: &LeafInfo<'_>) -> bool {
    leaf.property_in(EQUIPMENT_PROPERTY_FIELDS)
}

fn is_named_bucket(leaf: &LeafInfo<'_>) -> bool {
    leaf.property_in(NAMED_BUCKET_PROPERTIES) || leaf.parent_property() == NAMED_BUCKET_PARENT
}

fn is_various_type(leaf: &LeafInfo<'_>) -> bool {
    let type_like = leaf.property_name().is_some_and(|p| p.contains("type"))
        || leaf.parent_property().contains("types");

    type_like && !TYPE_VALUE_DENYLIST.contains(&leaf.text_or_empty())
}

// ============================================================
// Handlers
// ============================================================

fn keyed(leaf: &LeafInfo<'_>, rule: RuleKind, prefix: &str) -> Classification {
    let key = sanitize(leaf.text_or_empty());
    if key.is_empty() {
        return Classification::Unkeyable { rule };
    }
    Classification::Keyed {
        rule,
        path: format!("{}.{}", prefix, key),
    }
}

fn decide_measurement(leaf: &LeafInfo<'_>) -> Classification {
    let text = leaf.text_or_empty();
    let (key_source, _) = replace_with_variables(text, &NUMBER_REGEX, false);
    let (value, numbers) = replace_with_variables(text, &NUMBER_REGEX, true);

    let key = sanitize(&key_source);
    if key.is_empty() {
        return Classification::Unkeyable {
            rule: RuleKind::Measurement,
        };
    }

    Classification::Measurement {
        path: format!("common.measurements.{}", key),
        value,
        numbers,
    }
}

fn decide_list(leaf: &LeafInfo<'_>) -> Classification {
    let text = leaf.text_or_empty();
    let bucket = if leaf.property_name() == Some(LANGUAGE_LIST_PROPERTY) {
        ListBucket::Languages
    } else {
        ListBucket::DamageTypes
    };

    Classification::List {
        bucket,
        items: split_list(text),
        has_and: text.contains(" and "),
        oxford_comma: text.contains(", and "),
    }
}

fn decide_named_bucket(leaf: &LeafInfo<'_>) -> Classification {
    let bucket = if leaf.parent_property() == NAMED_BUCKET_PARENT {
        NAMED_BUCKET_PARENT
    } else {
        leaf.property_name().unwrap_or_default()
    };
    keyed(leaf, RuleKind::NamedBucket, &format!("common.{}", bucket))
}

/// Splits a list on `", and "`, `" and "` and `", "`, in that precedence.
/// Empty items are dropped.
pub fn split_list(text: &str) -> Vec<String> {
    LIST_SEPARATOR_REGEX
        .split(text)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
