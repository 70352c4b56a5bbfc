use std::{collections::HashMap, fmt, sync::LazyLock};

use crate::layer::model::LayerKind;

/// Pseudo-measure for Text layers that display their own literal content.
pub const CUSTOM_TEXT: &str = "custom-text";

/// Preview string shown when a Text layer switches back to [`CUSTOM_TEXT`].
pub const CUSTOM_TEXT_PREVIEW: &str = "Custom Text";

/// Placeholder in option values replaced by the layer's primary measure name.
pub const MEASURE_NAME_PLACEHOLDER: &str = "{measure}";

/// Fixed reference volume for every disk measure.
pub const REFERENCE_DRIVE: &str = "C:";

/// Declaration types understood by the target engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MeasureType {
    /// Clock/calendar value formatted with a strftime-style code.
    Time,
    /// Processor usage, optionally for a single core.
    Cpu,
    /// Volume label or capacity.
    FreeDiskSpace,
    /// Formula over other measures.
    Calc,
}

impl MeasureType {
    /// Keyword written after `Measure=`.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::Cpu => "CPU",
            Self::FreeDiskSpace => "FreeDiskSpace",
            Self::Calc => "Calc",
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Grouping used by the property panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureCategory {
    /// Clock values.
    Time,
    /// Calendar values.
    Date,
    /// Processor usage.
    Cpu,
    /// Volume information.
    Disk,
}

impl MeasureCategory {
    /// Lowercase category key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Date => "date",
            Self::Cpu => "cpu",
            Self::Disk => "disk",
        }
    }
}

/// One declaration a measure expands to.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DeclarationSpec {
    /// Appended to the primary measure name; empty for the primary declaration.
    pub suffix: String,
    /// Declaration type.
    pub kind: MeasureType,
    /// Ordered `key=value` options; values may contain [`MEASURE_NAME_PLACEHOLDER`].
    pub options: Vec<(String, String)>,
}

impl DeclarationSpec {
    fn new(kind: MeasureType, options: &[(&str, &str)]) -> Self {
        Self::with_suffix("", kind, options)
    }

    fn with_suffix(suffix: &str, kind: MeasureType, options: &[(&str, &str)]) -> Self {
        Self {
            suffix: suffix.to_string(),
            kind,
            options: options
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Declaration name for a layer whose primary measure is `primary`.
    pub fn name_for(&self, primary: &str) -> String {
        format!("{primary}{}", self.suffix)
    }

    /// Options with the name placeholder substituted.
    pub fn options_for(&self, primary: &str) -> Vec<(String, String)> {
        self.options
            .iter()
            .map(|(k, v)| (k.clone(), v.replace(MEASURE_NAME_PLACEHOLDER, primary)))
            .collect()
    }

    /// Whether this is the declaration meters bind to.
    pub fn is_primary(&self) -> bool {
        self.suffix.is_empty()
    }
}

/// How a measure is written to the output document.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Recipe {
    /// Declarations in emission order; dependencies come before the primary one.
    pub declarations: Vec<DeclarationSpec>,
    /// Text meter substitution template (`%1`, `%1%`, `%1 B`); empty for non-text kinds.
    pub value_template: String,
    /// Cycle length for rotators bound to bounded values.
    pub value_remainder: Option<u32>,
}

/// A Measure/Format Table entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MeasureEntry {
    /// Stable identifier stored on layers.
    pub id: String,
    /// The one layer kind this measure applies to.
    pub kind: LayerKind,
    /// Panel grouping.
    pub category: MeasureCategory,
    /// Human-readable label.
    pub label: String,
    /// Sample value for live preview.
    pub preview: String,
    /// Output recipe.
    pub recipe: Recipe,
}

struct MeasureTable {
    entries: Vec<MeasureEntry>,
    by_id: HashMap<String, usize>,
}

static TABLE: LazyLock<MeasureTable> = LazyLock::new(|| {
    let entries = build_entries();
    let by_id = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();
    MeasureTable { entries, by_id }
});

/// Look up a measure by identifier.
pub fn lookup(id: &str) -> Option<&'static MeasureEntry> {
    let table = &*TABLE;
    table.by_id.get(id).map(|&i| &table.entries[i])
}

/// Whether `id` is a table entry or [`CUSTOM_TEXT`].
pub fn is_known(id: &str) -> bool {
    id == CUSTOM_TEXT || lookup(id).is_some()
}

/// Every entry, in catalog order.
pub fn all_measures() -> &'static [MeasureEntry] {
    &TABLE.entries
}

/// Entries applicable to `kind`, in catalog order.
pub fn measures_for_kind(kind: LayerKind) -> impl Iterator<Item = &'static MeasureEntry> {
    TABLE.entries.iter().filter(move |e| e.kind == kind)
}

/// Categories offered for `kind`, in first-seen catalog order.
pub fn categories_for_kind(kind: LayerKind) -> Vec<MeasureCategory> {
    let mut out = Vec::new();
    for e in measures_for_kind(kind) {
        if !out.contains(&e.category) {
            out.push(e.category);
        }
    }
    out
}

/// Live-preview sample for `id`.
pub fn preview_value(id: &str) -> Option<&'static str> {
    if id == CUSTOM_TEXT {
        return Some(CUSTOM_TEXT_PREVIEW);
    }
    lookup(id).map(|e| e.preview.as_str())
}

/// Default measure assigned at creation time.
pub fn default_measure(kind: LayerKind) -> Option<&'static str> {
    match kind {
        LayerKind::Text => Some(CUSTOM_TEXT),
        LayerKind::Rotator => Some("rotator-time-second"),
        LayerKind::Image | LayerKind::Bar | LayerKind::Shape => None,
    }
}

const CORES: u32 = 8;
const DISK_DIVIDER: (&str, &str) = ("UpdateDivider", "5");
const DRIVE: (&str, &str) = ("Drive", REFERENCE_DRIVE);

struct EntryBuilder<'a> {
    kind: LayerKind,
    category: MeasureCategory,
    template: &'a str,
}

impl EntryBuilder<'_> {
    fn entry(
        &self,
        id: impl Into<String>,
        label: impl Into<String>,
        preview: impl Into<String>,
        declarations: Vec<DeclarationSpec>,
        value_remainder: Option<u32>,
    ) -> MeasureEntry {
        MeasureEntry {
            id: id.into(),
            kind: self.kind,
            category: self.category,
            label: label.into(),
            preview: preview.into(),
            recipe: Recipe {
                declarations,
                value_template: self.template.to_string(),
                value_remainder,
            },
        }
    }
}

fn time_format(format: &str) -> Vec<DeclarationSpec> {
    vec![DeclarationSpec::new(MeasureType::Time, &[("Format", format)])]
}

fn cpu(core: Option<u32>) -> Vec<DeclarationSpec> {
    match core {
        None => vec![DeclarationSpec::new(MeasureType::Cpu, &[])],
        Some(n) => {
            let n = n.to_string();
            vec![DeclarationSpec::new(
                MeasureType::Cpu,
                &[("Processor", n.as_str())],
            )]
        }
    }
}

fn disk(extra: Option<(&str, &str)>) -> Vec<DeclarationSpec> {
    let mut opts = vec![DRIVE];
    opts.extend(extra);
    opts.push(DISK_DIVIDER);
    vec![DeclarationSpec::new(MeasureType::FreeDiskSpace, &opts)]
}

fn build_entries() -> Vec<MeasureEntry> {
    let mut out = Vec::new();

    let text_time = EntryBuilder {
        kind: LayerKind::Text,
        category: MeasureCategory::Time,
        template: "%1",
    };
    for (id, label, preview, format) in [
        ("time-hour-minute-24", "Hour:Minute (24h)", "15:15", "%H:%M"),
        ("time-hour-minute-12", "Hour:Minute (12h)", "03:15 PM", "%I:%M %p"),
        ("time-hour-24", "Hour (24h)", "15", "%H"),
        ("time-hour-12", "Hour (12h)", "03", "%I"),
        ("time-minute", "Minute", "30", "%M"),
        ("time-second", "Second", "45", "%S"),
        ("time-am-pm", "AM/PM", "PM", "%p"),
    ] {
        out.push(text_time.entry(id, label, preview, time_format(format), None));
    }

    let text_date = EntryBuilder {
        category: MeasureCategory::Date,
        ..text_time
    };
    for (id, label, preview, format) in [
        ("date-yyyy-mm-dd", "YYYY-MM-DD", "2025-01-01", "%F"),
        ("date-mm-dd-yy", "MM/DD/YY", "01-01-25", "%D"),
        ("date-month-number", "Month (number)", "01", "%m"),
        ("date-month-full", "Month (full name)", "January", "%B"),
        ("date-month-short", "Month (short name)", "Jan", "%b"),
        ("date-day-number", "Day (number)", "01", "%d"),
        ("date-day-full", "Day (full name)", "Monday", "%A"),
        ("date-day-short", "Day (short name)", "Mon", "%a"),
        ("date-year-short", "Year (short)", "25", "%g"),
        ("date-year-full", "Year (full)", "2025", "%G"),
    ] {
        out.push(text_date.entry(id, label, preview, time_format(format), None));
    }

    let text_cpu = EntryBuilder {
        kind: LayerKind::Text,
        category: MeasureCategory::Cpu,
        template: "%1%",
    };
    out.push(text_cpu.entry("cpu-average", "Average CPU Usage", "69%", cpu(None), None));
    for n in 1..=CORES {
        out.push(text_cpu.entry(
            format!("cpu-core-{n}"),
            format!("Core {n} Usage"),
            format!("{}%", n * 10),
            cpu(Some(n)),
            None,
        ));
    }

    let text_disk_label = EntryBuilder {
        kind: LayerKind::Text,
        category: MeasureCategory::Disk,
        template: "%1",
    };
    out.push(text_disk_label.entry(
        "disk-c-label",
        "Disk C Label",
        "Windows",
        disk(Some(("Label", "1"))),
        None,
    ));
    let text_disk_bytes = EntryBuilder {
        template: "%1 B",
        ..text_disk_label
    };
    out.push(text_disk_bytes.entry(
        "disk-c-total-space",
        "Disk C Total Space",
        "123456789 B",
        disk(Some(("Total", "1"))),
        None,
    ));
    out.push(text_disk_bytes.entry(
        "disk-c-free-space",
        "Disk C Free Space",
        "123456789 B",
        disk(None),
        None,
    ));
    out.push(text_disk_bytes.entry(
        "disk-c-used-space",
        "Disk C Used Space",
        "123456789 B",
        disk(Some(("InvertMeasure", "1"))),
        None,
    ));

    let rotator_time = EntryBuilder {
        kind: LayerKind::Rotator,
        category: MeasureCategory::Time,
        template: "",
    };
    for (id, label, preview, remainder) in [
        ("rotator-time-second", "Seconds", "45", 60),
        ("rotator-time-minute", "Minutes", "30", 3600),
        ("rotator-time-hour", "Hours", "15", 43200),
    ] {
        out.push(rotator_time.entry(
            id,
            label,
            preview,
            vec![DeclarationSpec::new(MeasureType::Time, &[])],
            Some(remainder),
        ));
    }

    let rotator_cpu = EntryBuilder {
        category: MeasureCategory::Cpu,
        ..rotator_time
    };
    out.push(rotator_cpu.entry(
        "rotator-cpu-average",
        "Average CPU Usage",
        "69%",
        cpu(None),
        None,
    ));
    for n in 1..=CORES {
        out.push(rotator_cpu.entry(
            format!("rotator-cpu-core-{n}"),
            format!("Core {n} Usage"),
            format!("{}%", n * 10),
            cpu(Some(n)),
            None,
        ));
    }

    let rotator_disk = EntryBuilder {
        category: MeasureCategory::Disk,
        ..rotator_time
    };
    out.push(rotator_disk.entry(
        "rotator-disk-c-usage",
        "Disk C Usage",
        "42%",
        vec![
            DeclarationSpec::with_suffix(
                "Total",
                MeasureType::FreeDiskSpace,
                &[DRIVE, ("Total", "1"), DISK_DIVIDER],
            ),
            DeclarationSpec::with_suffix(
                "Used",
                MeasureType::FreeDiskSpace,
                &[DRIVE, ("InvertMeasure", "1"), DISK_DIVIDER],
            ),
            DeclarationSpec::new(
                MeasureType::Calc,
                &[
                    ("Formula", "{measure}Used / {measure}Total"),
                    DISK_DIVIDER,
                ],
            ),
        ],
        None,
    ));

    let bar_cpu = EntryBuilder {
        kind: LayerKind::Bar,
        category: MeasureCategory::Cpu,
        template: "",
    };
    out.push(bar_cpu.entry("bar-cpu", "CPU", "69%", cpu(None), None));
    let bar_disk = EntryBuilder {
        category: MeasureCategory::Disk,
        ..bar_cpu
    };
    out.push(bar_disk.entry(
        "bar-disk",
        "Disk",
        "42%",
        disk(Some(("InvertMeasure", "1"))),
        None,
    ));

    out
}

#[cfg(test)]
#[path = "../../tests/unit/measure/table.rs"]
mod tests;
