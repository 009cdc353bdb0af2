//! Prompt text sent to the model.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, Local};
use serde_json::Value;

use crate::types::RealTimeBundle;

/// Model turn acknowledging the instructions.
pub const ACKNOWLEDGEMENT: &str =
    "Entendido. Vou seguir essas instruções e usar informações atualizadas.";

/// Reply used when the model answers without text.
pub const FALLBACK_REPLY: &str = "Não consegui gerar uma resposta.";

/// Items shown per real-time result.
const ITEMS_PER_RESULT: usize = 3;

/// Instructions turn, anchored to the current date.
pub fn system_instructions(now: DateTime<Local>) -> String {
    let date = now.format("%d de %B de %Y");
    let year = now.year();
    format!(
        "INSTRUÇÕES DO SISTEMA:\n\
Você é um chatbot político neutro e informativo para o público brasileiro.

DATA ATUAL: A data atual é {date} (ano {year}). Use esta data como referência ao responder sobre eventos recentes, atuais ou futuros.

IMPORTANTE - BUSCA NA WEB:
- Você TEM acesso ao Google Search (ferramenta de busca na web) habilitada.
- SEMPRE use o Google Search para buscar informações atualizadas quando a pergunta for sobre eventos recentes, notícias atuais, processos em andamento ou dados que possam ter mudado.
- Priorize informações encontradas na web sobre o conhecimento pré-treinado quando se tratar de eventos recentes.

Princípios:
- Seja factual e forneça informações detalhadas sobre o tema perguntado.
- Explique o contexto, histórico e detalhes relevantes da pergunta.
- Não faça persuasão política personalizada. Não promova ou desincentive votos.
- Se houver desinformação potencial, aponte com respeito e ofereça verificação.
- Use a data atual para contextualizar eventos e informações temporais.

Formato:
- Responda em português claro e detalhado.
- Forneça contexto histórico e informações completas sobre o tema.
- Quando mencionar datas, use o ano atual ({year}) como referência quando apropriado.

IMPORTANTE - Links de fontes oficiais:
- Inclua links de fontes oficiais (TSE, Planalto, Câmara, Senado, CNJ) APENAS quando a pergunta tratar de processos legislativos, dados eleitorais, parlamentares específicos, status atual de tramitações, ou quando fontes forem solicitadas explicitamente.
- NÃO inclua links em perguntas teóricas, conceituais, educacionais, conversacionais ou sobre história política já documentada.
- Quando incluir fontes, use APENAS os sites relevantes ao tema específico da pergunta."
    )
}

/// Block appended to the user's message when live data was found.
///
/// Empty when the bundle has no results.
pub fn render_real_time(bundle: &RealTimeBundle) -> String {
    if bundle.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n\n[INFORMAÇÕES EM TEMPO REAL - Buscadas agora]\n");
    let _ = writeln!(out, "Última atualização: {}\n", bundle.generated_at_display());

    for (i, result) in bundle.results().iter().enumerate() {
        let _ = writeln!(out, "\n{}. {} - {}", i + 1, result.source, result.kind);
        if let Some(items) = &result.payload {
            for line in items.iter().take(ITEMS_PER_RESULT).filter_map(render_item) {
                let _ = writeln!(out, "   - {line}");
            }
        }
        if let Some(note) = &result.note {
            let _ = writeln!(out, "   Nota: {note}");
        }
        if let Some(url) = &result.reference_url {
            let _ = writeln!(out, "   URL: {url}");
        }
    }

    let _ = writeln!(out, "\nObservação: {}", bundle.note());
    out.push_str("\nUse essas informações em tempo real para complementar sua resposta quando relevante.\n");
    out
}

/// One-line summary of an upstream item; `None` when it has no usable label.
fn render_item(item: &Value) -> Option<String> {
    let text = |key: &str| item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

    if let Some(nome) = text("nome") {
        return Some(match text("sigla") {
            Some(sigla) => format!("{nome} ({sigla})"),
            None => nome.to_string(),
        });
    }
    let sigla_tipo = text("siglaTipo")?;
    Some(match item.get("numero").and_then(Value::as_f64) {
        Some(numero) => format!("{sigla_tipo} {numero:.0}"),
        None => sigla_tipo.to_string(),
    })
}
