use serde::{Deserialize, Serialize};
use std::fmt;

/// Texto fijo que indica que no se pudo derivar ninguna prueba para una subcategoría
pub const PLACEHOLDER: &str =
    "_No specific tests derivable from the description for this sub-category._";

/// Tipo de prueba (primer nivel de la estructura generada)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Functional,
    Regression,
    NonFunctional,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::Functional,
        Section::Regression,
        Section::NonFunctional,
    ];

    /// Valor de la columna "Type" en el CSV
    pub fn label(&self) -> &'static str {
        match self {
            Section::Functional => "Functional",
            Section::Regression => "Regression",
            Section::NonFunctional => "Non-Functional",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Subcategoría dentro de cada tipo de prueba
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubCategory {
    Happy,
    Alternative,
    Negative,
    Edge,
}

impl SubCategory {
    pub const ALL: [SubCategory; 4] = [
        SubCategory::Happy,
        SubCategory::Alternative,
        SubCategory::Negative,
        SubCategory::Edge,
    ];

    /// Valor de la columna "Category" en el CSV
    pub fn label(&self) -> &'static str {
        match self {
            SubCategory::Happy => "Happy Case",
            SubCategory::Alternative => "Alternative Case",
            SubCategory::Negative => "Negative Case",
            SubCategory::Edge => "Edge Case",
        }
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Las cuatro subcategorías de un tipo de prueba
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseGroup {
    #[serde(rename = "happyCases", alias = "happy")]
    pub happy: Vec<String>,
    #[serde(rename = "alternativeCases", alias = "alternative")]
    pub alternative: Vec<String>,
    #[serde(rename = "negativeCases", alias = "negative")]
    pub negative: Vec<String>,
    #[serde(rename = "edgeCases", alias = "edge")]
    pub edge: Vec<String>,
}

impl CaseGroup {
    pub fn cases(&self, sub: SubCategory) -> &[String] {
        match sub {
            SubCategory::Happy => &self.happy,
            SubCategory::Alternative => &self.alternative,
            SubCategory::Negative => &self.negative,
            SubCategory::Edge => &self.edge,
        }
    }
}

/// Casos de prueba estructurados devueltos por la primera llamada al modelo.
///
/// Las 12 hojas son obligatorias; las claves desconocidas se ignoran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredTestCases {
    #[serde(rename = "functionalTestCases", alias = "functional")]
    pub functional: CaseGroup,
    #[serde(rename = "regressionTestCases", alias = "regression")]
    pub regression: CaseGroup,
    #[serde(rename = "nonFunctionalTestCases", alias = "nonFunctional")]
    pub non_functional: CaseGroup,
}

impl StructuredTestCases {
    pub fn group(&self, section: Section) -> &CaseGroup {
        match section {
            Section::Functional => &self.functional,
            Section::Regression => &self.regression,
            Section::NonFunctional => &self.non_functional,
        }
    }

    /// Objetivos de prueba en orden de recorrido, sin el texto de relleno
    pub fn objectives(&self) -> impl Iterator<Item = (Section, SubCategory, &str)> + '_ {
        Section::ALL.into_iter().flat_map(move |section| {
            SubCategory::ALL.into_iter().flat_map(move |sub| {
                self.group(section)
                    .cases(sub)
                    .iter()
                    .filter(|case| !is_placeholder(case))
                    .map(move |case| (section, sub, case.as_str()))
            })
        })
    }

    /// Número de filas que debe producir la transformación
    pub fn objective_count(&self) -> usize {
        self.objectives().count()
    }
}

pub fn is_placeholder(text: &str) -> bool {
    text.trim() == PLACEHOLDER
}

/// Caso de prueba detallado (una fila del CSV exportado)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DetailedTestCase {
    #[serde(rename = "TC ID")]
    pub id: String,
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "User Story ID")]
    pub user_story_id: String,
    #[serde(rename = "Description / Summary")]
    pub summary: String,
    #[serde(rename = "Type")]
    pub test_type: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "AS (Actor)")]
    pub actor: String,
    #[serde(rename = "GIVEN (Precondition)")]
    pub given: String,
    #[serde(rename = "WHEN (Steps)")]
    pub when: String,
    #[serde(rename = "THEN (Expected Result)")]
    pub then: String,
    #[serde(rename = "Result (latest)")]
    pub last_result: String,
    #[serde(rename = "Est (mins)")]
    pub estimate_minutes: String,
    #[serde(rename = "Date Run")]
    pub date_run: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl DetailedTestCase {
    pub const HEADERS: [&'static str; 15] = [
        "TC ID",
        "Feature",
        "User Story ID",
        "Description / Summary",
        "Type",
        "Category",
        "Priority",
        "AS (Actor)",
        "GIVEN (Precondition)",
        "WHEN (Steps)",
        "THEN (Expected Result)",
        "Result (latest)",
        "Est (mins)",
        "Date Run",
        "Notes",
    ];

    /// Columnas que siempre quedan vacías al crear el caso
    pub const BLANK_COLUMNS: [usize; 3] = [11, 13, 14];

    /// Construye el caso a partir de un registro exportado de 15 columnas
    pub fn from_record(record: &[String]) -> Option<Self> {
        if record.len() != Self::HEADERS.len() {
            return None;
        }

        let field = |i: usize| record[i].clone();

        Some(DetailedTestCase {
            id: field(0),
            feature: field(1),
            user_story_id: field(2),
            summary: field(3),
            test_type: field(4),
            category: field(5),
            priority: field(6),
            actor: field(7),
            given: field(8),
            when: field(9),
            then: field(10),
            last_result: String::new(),
            estimate_minutes: field(12),
            date_run: String::new(),
            notes: String::new(),
        })
    }
}
