//! Static catalog of official and fact-checking sources.

use std::collections::BTreeMap;

use serde::Serialize;

/// A reference site shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLink {
    pub nome: &'static str,
    pub url: &'static str,
    pub descricao: &'static str,
}

const fn link(nome: &'static str, url: &'static str, descricao: &'static str) -> SourceLink {
    SourceLink {
        nome,
        url,
        descricao,
    }
}

const OFICIAIS: &[SourceLink] = &[
    link(
        "Tribunal Superior Eleitoral (TSE)",
        "https://www.tse.jus.br/",
        "Dados eleitorais, candidatos e resultados",
    ),
    link(
        "Câmara dos Deputados",
        "https://www.camara.leg.br/",
        "Projetos de lei, tramitação e deputados",
    ),
    link(
        "Senado Federal",
        "https://www25.senado.leg.br/",
        "Proposições, senadores e tramitação",
    ),
    link(
        "Presidência da República",
        "https://www.planalto.gov.br/",
        "Leis, decretos e atos normativos",
    ),
    link(
        "Conselho Nacional de Justiça (CNJ)",
        "https://www.cnj.jus.br/",
        "Normas judiciais e jurisprudência",
    ),
];

const APIS: &[SourceLink] = &[
    link(
        "Dados Abertos - Câmara",
        "https://dadosabertos.camara.leg.br/",
        "API para dados da Câmara dos Deputados",
    ),
    link(
        "Dados Abertos - Senado",
        "https://legis.senado.leg.br/dadosabertos/",
        "API para dados do Senado Federal",
    ),
];

const VERIFICACAO: &[SourceLink] = &[
    link(
        "Agência Lupa",
        "https://piaui.folha.uol.com.br/lupa/",
        "Verificação de fatos e checagem",
    ),
    link(
        "Aos Fatos",
        "https://www.aosfatos.org/",
        "Verificação de informações",
    ),
];

/// Sources grouped as `oficiais`, `apis` and `verificacao`.
pub fn official_sources() -> BTreeMap<&'static str, Vec<SourceLink>> {
    BTreeMap::from([
        ("oficiais", OFICIAIS.to_vec()),
        ("apis", APIS.to_vec()),
        ("verificacao", VERIFICACAO.to_vec()),
    ])
}
