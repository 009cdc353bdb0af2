//! The fixed catalogue of real-time sources.
//!
//! Three sources query public open-data APIs; two only contribute a static
//! pointer to the official site. Each is gated on keywords found in the
//! lower-cased query.

use serde_json::Value;

use crate::types::RealTimeResult;

/// Which configured base URL a live source is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Api {
    Camara,
    Senado,
}

/// A source backed by a JSON endpoint.
#[derive(Debug)]
pub(crate) struct LiveSource {
    /// Metric/log label.
    pub name: &'static str,
    keywords: &'static [&'static str],
    pub api: Api,
    /// Path appended to the base URL; `{year}` is substituted.
    path: &'static str,
    /// JSON pointers tried in order for the item array.
    item_pointers: &'static [&'static str],
    cap: usize,
    fonte: &'static str,
    tipo: &'static str,
    reference_url: &'static str,
}

const CAMARA_FONTE: &str = "Câmara dos Deputados";
const CAMARA_URL: &str = "https://www.camara.leg.br/";

pub(crate) const CAMARA_PROPOSICOES: LiveSource = LiveSource {
    name: "camara_proposicoes",
    keywords: &["projeto", "tramitação", "proposição"],
    api: Api::Camara,
    path: "/proposicoes?ano={year}&itens=10&ordem=ASC&ordenarPor=id",
    item_pointers: &["/dados"],
    cap: 5,
    fonte: CAMARA_FONTE,
    tipo: "proposições",
    reference_url: CAMARA_URL,
};

pub(crate) const CAMARA_DEPUTADOS: LiveSource = LiveSource {
    name: "camara_deputados",
    keywords: &["deputado"],
    api: Api::Camara,
    path: "/deputados?itens=10&ordem=ASC&ordenarPor=nome",
    item_pointers: &["/dados"],
    cap: 5,
    fonte: CAMARA_FONTE,
    tipo: "deputados",
    reference_url: CAMARA_URL,
};

pub(crate) const SENADO_SENADORES: LiveSource = LiveSource {
    name: "senado_senadores",
    keywords: &["senado", "senador"],
    api: Api::Senado,
    path: "/senador/lista/atual",
    item_pointers: &[
        "/ListaParlamentarEmExercicio/Parlamentares/Parlamentar",
        "/ListaParlamentarEmExercicio/Parlamentar",
    ],
    cap: 10,
    fonte: "Senado Federal",
    tipo: "senadores",
    reference_url: "https://www25.senado.leg.br/",
};

impl LiveSource {
    pub fn matches(&self, lower_query: &str) -> bool {
        contains_any(lower_query, self.keywords)
    }

    pub fn url(&self, base: &str, year: i32) -> String {
        let path = self.path.replace("{year}", &year.to_string());
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    /// First non-empty item array found, truncated to the cap.
    pub fn extract(&self, body: &Value) -> Option<Vec<Value>> {
        self.item_pointers
            .iter()
            .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_array))
            .find(|items| !items.is_empty())
            .map(|items| items.iter().take(self.cap).cloned().collect())
    }

    pub fn result(&self, items: Vec<Value>) -> RealTimeResult {
        RealTimeResult::with_items(self.fonte, self.tipo, items, self.reference_url)
    }
}

const TSE_KEYWORDS: &[&str] = &["eleições", "tse", "candidato", "votação"];
const PLANALTO_KEYWORDS: &[&str] = &["lei", "decreto", "sanção", "sancionado"];

/// Electoral authority pointer.
pub(crate) fn tse_note(lower_query: &str) -> Option<RealTimeResult> {
    contains_any(lower_query, TSE_KEYWORDS).then(|| {
        RealTimeResult::with_note(
            "TSE - Tribunal Superior Eleitoral",
            "informações eleitorais",
            "Para dados eleitorais atualizados, consulte: https://www.tse.jus.br/",
            "https://www.tse.jus.br/",
        )
    })
}

/// Executive legislation pointer for the current year's acts folder.
pub(crate) fn planalto_note(lower_query: &str, year: i32) -> Option<RealTimeResult> {
    contains_any(lower_query, PLANALTO_KEYWORDS).then(|| {
        RealTimeResult::with_note(
            "Planalto",
            "legislação",
            format!(
                "Para leis e decretos de {year}, consulte: https://www.planalto.gov.br/ccivil_03/_ato{}/{year}/",
                acts_range(year)
            ),
            "https://www.planalto.gov.br/",
        )
    })
}

/// Planalto groups acts by presidential term.
fn acts_range(year: i32) -> &'static str {
    match year {
        2025.. => "2025-2030",
        2019.. => "2019-2024",
        _ => "2011-2018",
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
