//! # Enumerated Value Types
//!
//! Closed sets of allowed string values used by dataset and edition
//! metadata. Construction is permissive: [`ClosedEnum::parse`] returns
//! `None` for an unknown or empty input instead of failing, so that the
//! rejection happens later, during whole-record validation, where the
//! error can name the field and list the permitted values.
//!
//! Two representations exist:
//!
//! - Compile-time enums implementing [`ClosedEnum`] (`DatasetType`,
//!   `AlertType`, `QualityDesignation`, `DistributionFormat`, `MediaType`).
//! - The runtime [`EnumSet`], which is what a schema description's
//!   `enum` key compiles to. A built-in enum converts into an `EnumSet`
//!   with [`EnumSet::of`], and schema documents may refer to built-ins
//!   by type name ([`EnumSet::builtin`]).

use serde::{Deserialize, Serialize};

use crate::value::EnumValue;

/// A closed enumerated type with a fixed member list.
pub trait ClosedEnum: Sized + Copy + 'static {
    /// Type name used in diagnostics and schema references.
    const TYPE_NAME: &'static str;
    /// All members in declaration order.
    const MEMBERS: &'static [Self];

    /// The member's document value (e.g. `"static"`).
    fn value(self) -> &'static str;

    /// The member's symbolic name (e.g. `"STATIC"`).
    fn name(self) -> &'static str;

    /// Resolve a raw string to a member, or `None` if it is not one.
    fn parse(raw: &str) -> Option<Self> {
        Self::MEMBERS.iter().copied().find(|m| m.value() == raw)
    }

    /// All member values in declaration order.
    fn values() -> Vec<&'static str> {
        Self::MEMBERS.iter().map(|m| m.value()).collect()
    }

    /// All member names in declaration order.
    fn names() -> Vec<&'static str> {
        Self::MEMBERS.iter().map(|m| m.name()).collect()
    }

    /// Whether `raw` is the value of some member.
    fn has_value(raw: &str) -> bool {
        Self::parse(raw).is_some()
    }
}

/// Define a closed enum with symbolic member names and document values.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident : $member:literal = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant, )+
        }

        impl ClosedEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const MEMBERS: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn value(self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $member, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.value())
            }
        }
    };
}

closed_enum! {
    /// Kind of dataset being published.
    pub enum DatasetType {
        /// Filterable dataset.
        Filterable: "FILTERABLE" = "filterable",
        /// Cantabular flexible table.
        CantabularFlexibleTable: "CANTABULAR_FLEXIBLE_TABLE" = "cantabular_flexible_table",
        /// Cantabular multivariate table.
        CantabularMultivariateTable: "CANTABULAR_MULTIVARIATE_TABLE" = "cantabular_multivariable_table",
        /// Static file download.
        Static: "STATIC" = "static",
    }
}

closed_enum! {
    /// Kind of notice attached to an edition.
    pub enum AlertType {
        /// General alert.
        Alert: "ALERT" = "alert",
        /// Correction notice.
        Correction: "CORRECTION" = "correction",
    }
}

closed_enum! {
    /// Official statistics quality designation.
    pub enum QualityDesignation {
        /// Accredited official statistics.
        AccreditedOfficial: "ACCREDITED_OFFICIAL" = "accredited-official",
        /// Official statistics.
        Official: "OFFICIAL" = "official",
        /// Official statistics in development.
        OfficialInDevelopment: "OFFICIAL_IN_DEVELOPMENT" = "official-in-development",
    }
}

closed_enum! {
    /// File format of a distribution.
    pub enum DistributionFormat {
        /// Comma-separated values.
        Csv: "CSV" = "csv",
        /// SDMX structure-specific XML.
        Sdmx: "SDMX" = "sdmx",
        /// Legacy Excel workbook.
        Xls: "XLS" = "xls",
        /// Office Open XML workbook.
        Xlsx: "XLSX" = "xlsx",
        /// CSDB time-series text file.
        Csdb: "CSDB" = "csdb",
    }
}

closed_enum! {
    /// IANA media type of a distribution.
    pub enum MediaType {
        /// `text/csv`.
        Csv: "CSV" = "text/csv",
        /// SDMX structure-specific data, spelled `structurespecficdata` as
        /// existing records carry it.
        Sdmx: "SDMX" = "application/vnd.sdmx.structurespecficdata+xml",
        /// `application/vnd.ms-excel`.
        Xls: "XLS" = "application/vnd.ms-excel",
        /// Office Open XML spreadsheet.
        Xlsx: "XLSX" = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        /// CSDB files are served as plain text.
        Csdb: "CSDB" = "text/plain",
    }
}

impl DistributionFormat {
    /// The media type that a distribution of this format is served as.
    pub fn media_type(self) -> MediaType {
        match self {
            Self::Csv => MediaType::Csv,
            Self::Sdmx => MediaType::Sdmx,
            Self::Xls => MediaType::Xls,
            Self::Xlsx => MediaType::Xlsx,
            Self::Csdb => MediaType::Csdb,
        }
    }
}

/// Type names accepted by [`EnumSet::builtin`].
pub const BUILTIN_ENUMS: &[&str] = &[
    DatasetType::TYPE_NAME,
    AlertType::TYPE_NAME,
    QualityDesignation::TYPE_NAME,
    DistributionFormat::TYPE_NAME,
    MediaType::TYPE_NAME,
];

// ─── Runtime enum sets ──────────────────────────────────────────────

/// One member of an [`EnumSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    /// Symbolic name.
    pub name: String,
    /// Document value.
    pub value: String,
}

/// A closed set of string values known at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumSet {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumSet {
    /// Build a set from explicit members.
    pub fn new(name: impl Into<String>, members: Vec<EnumMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Build a set from bare values; member names are derived by
    /// upper-casing and replacing non-alphanumerics with `_`.
    pub fn from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = values
            .into_iter()
            .map(|v| {
                let value: String = v.into();
                let name = value
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() {
                            c.to_ascii_uppercase()
                        } else {
                            '_'
                        }
                    })
                    .collect();
                EnumMember { name, value }
            })
            .collect();
        Self::new(name, members)
    }

    /// The runtime set for a compile-time enum.
    pub fn of<E: ClosedEnum>() -> Self {
        let members = E::MEMBERS
            .iter()
            .map(|m| EnumMember {
                name: m.name().to_string(),
                value: m.value().to_string(),
            })
            .collect();
        Self::new(E::TYPE_NAME, members)
    }

    /// Look up a built-in enum by type name.
    pub fn builtin(type_name: &str) -> Option<Self> {
        match type_name {
            "DatasetType" => Some(Self::of::<DatasetType>()),
            "AlertType" => Some(Self::of::<AlertType>()),
            "QualityDesignation" => Some(Self::of::<QualityDesignation>()),
            "DistributionFormat" => Some(Self::of::<DistributionFormat>()),
            "MediaType" => Some(Self::of::<MediaType>()),
            _ => None,
        }
    }

    /// Type name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Resolve a raw value to its member, or `None`.
    pub fn parse(&self, raw: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == raw)
    }

    /// Resolve a raw value to a canonical [`EnumValue`], or `None`.
    pub fn resolve(&self, raw: &str) -> Option<EnumValue> {
        self.parse(raw).map(|m| EnumValue {
            type_name: self.name.clone(),
            name: m.name.clone(),
            value: m.value.clone(),
        })
    }

    /// Whether `raw` is the value of some member.
    pub fn has_value(&self, raw: &str) -> bool {
        self.parse(raw).is_some()
    }

    /// All member values in declaration order.
    pub fn values(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.value.as_str()).collect()
    }

    /// All member names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_value() {
        assert_eq!(DatasetType::parse("static"), Some(DatasetType::Static));
        assert_eq!(
            QualityDesignation::parse("accredited-official"),
            Some(QualityDesignation::AccreditedOfficial)
        );
    }

    #[test]
    fn test_parse_unknown_or_empty_is_none() {
        assert_eq!(DatasetType::parse("bogus"), None);
        assert_eq!(DatasetType::parse(""), None);
        // Names are not values.
        assert_eq!(DatasetType::parse("STATIC"), None);
    }

    #[test]
    fn test_values_and_names_in_declaration_order() {
        assert_eq!(AlertType::values(), vec!["alert", "correction"]);
        assert_eq!(AlertType::names(), vec!["ALERT", "CORRECTION"]);
        assert!(DistributionFormat::has_value("xlsx"));
        assert!(!DistributionFormat::has_value("pdf"));
    }

    #[test]
    fn test_multivariate_value_is_preserved_verbatim() {
        assert_eq!(
            DatasetType::CantabularMultivariateTable.value(),
            "cantabular_multivariable_table"
        );
    }

    #[test]
    fn test_serde_uses_document_value() {
        let json = serde_json::to_string(&MediaType::Csv).unwrap();
        assert_eq!(json, "\"text/csv\"");
        let parsed: AlertType = serde_json::from_str("\"correction\"").unwrap();
        assert_eq!(parsed, AlertType::Correction);
    }

    #[test]
    fn test_distribution_format_media_type() {
        assert_eq!(DistributionFormat::Csv.media_type(), MediaType::Csv);
        assert_eq!(DistributionFormat::Csdb.media_type().value(), "text/plain");
    }

    #[test]
    fn test_enum_set_of_builtin() {
        let set = EnumSet::of::<DatasetType>();
        assert_eq!(set.name(), "DatasetType");
        assert_eq!(set.values().len(), 4);
        let resolved = set.resolve("filterable").unwrap();
        assert_eq!(resolved.name, "FILTERABLE");
        assert_eq!(resolved.type_name, "DatasetType");
    }

    #[test]
    fn test_enum_set_builtin_lookup() {
        for name in BUILTIN_ENUMS {
            assert!(EnumSet::builtin(name).is_some(), "missing builtin {name}");
        }
        assert!(EnumSet::builtin("Nope").is_none());
    }

    #[test]
    fn test_enum_set_from_values_derives_names() {
        let set = EnumSet::from_values("Kind", ["static", "flexible-table"]);
        assert_eq!(set.names(), vec!["STATIC", "FLEXIBLE_TABLE"]);
        assert!(set.has_value("flexible-table"));
        assert!(set.parse("Static").is_none());
    }

    #[test]
    fn test_display_is_value() {
        assert_eq!(DatasetType::Static.to_string(), "static");
    }
}
