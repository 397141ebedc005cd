//! Fixed phrases and keywords printed on the supported statements.

use std::sync::LazyLock;

use regex::Regex;

/// Static text cues shared by both layouts of the statement family.
#[derive(Debug)]
pub struct Vocabulary {
    /// Literal phrase that opens the movements table.
    pub start_trigger: &'static str,
    /// Title phrases whose bottom edge bounds the header search, tried in order.
    pub horizon_phrases: Vec<Regex>,
    /// Phrases that close the movements table.
    pub stop_triggers: Vec<Regex>,
    /// Phrases that start the page footer.
    pub footers: Vec<Regex>,
    /// Running page-header text that never belongs to a row.
    pub page_headers: Vec<Regex>,
    /// Column-label fragments; any word containing one is header noise.
    pub header_noise: &'static [&'static str],
    /// Labels whose presence near the top of a page re-opens recording.
    pub wake_up_headers: &'static [&'static str],
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid vocabulary regex"))
        .collect()
}

pub static STATEMENT_VOCABULARY: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary {
    start_trigger: "Detalle de Movimientos Realizados",
    horizon_phrases: compile(&[
        r"Detalle de Movimientos Realizados",
        r"Detalle de Movimientos",
    ]),
    stop_triggers: compile(&[
        r"(?i)Total\s+de\s+Movimientos",
        r"(?i)TOTAL\s+IMPORTE",
    ]),
    footers: compile(&[
        r"(?i)La\s+GAT\s+Real",
        r"(?i)BBVA\s+MEXICO",
        r"(?i)PAGINA\s+\d+/\d+",
    ]),
    page_headers: compile(&[
        r"(?i)BBVA",
        r"(?i)Estado\s+de\s+Cuenta",
        r"(?i)PAGINA",
        r"(?i)Cuenta",
        r"(?i)Cliente",
    ]),
    header_noise: &[
        "OPER",
        "LIQ",
        "DESCRIPCION",
        "DESCRIPCIÓN",
        "REFERENCIA",
        "CARGOS",
        "ABONOS",
        "OPERACION",
        "OPERACIÓN",
        "LIQUIDACION",
        "LIQUIDACIÓN",
        "SALDO",
        "FECHA",
    ],
    wake_up_headers: &["FECHA", "OPER", "LIQ", "CARGOS", "ABONOS", "SALDO"],
});

fn squash(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | ':'))
        .collect()
}

impl Vocabulary {
    pub fn has_start_trigger(&self, page_text: &str) -> bool {
        page_text.contains(self.start_trigger)
    }

    pub fn has_stop_trigger(&self, page_text: &str) -> bool {
        self.stop_triggers.iter().any(|re| re.is_match(page_text))
    }

    /// Column labels leaking into cells (`CARGOS`, `Saldo:` ...).
    pub fn is_header_noise(&self, text: &str) -> bool {
        let cleaned = squash(text);
        self.header_noise.iter().any(|k| cleaned.contains(k))
    }

    pub fn is_page_header_text(&self, text: &str) -> bool {
        self.page_headers.iter().any(|re| re.is_match(text))
    }

    /// Exact wake-up label match after stripping spaces and dots.
    pub fn is_wake_up_header(&self, text: &str) -> bool {
        let cleaned = squash(text);
        self.wake_up_headers.iter().any(|k| *k == cleaned)
    }
}

/// True for the `Referencia` label that prefixes a reference value.
///
/// Case-sensitive: the upper-case `REFERENCIA` column header is not a label.
pub fn is_reference_label(text: &str) -> bool {
    text.contains("Referencia") || text.contains("referencia")
}

/// Start of a reference value inside the reference zone, including split `Refer-` fragments.
pub fn is_reference_anchor(text: &str) -> bool {
    text.contains("Refer") || text.contains("referencia")
}
