//! Text syntax for list fields edited in a single input.
//!
//! - plain lists: `Diabetes, Hipertensão`
//! - allergies: `dipirona: urticária; penicilina: anafilaxia`
//! - medications: `losartana | 50mg | 1x/dia; metformina | 850mg | 2x/dia`

use super::sections::{Alergia, Medicacao};

/// Split a comma-separated list, trimming entries and dropping empties
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn format_list(items: &[String]) -> String {
    items.join(", ")
}

fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.split(';').map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_alergias(text: &str) -> Vec<Alergia> {
    entries(text)
        .map(|entry| match entry.split_once(':') {
            Some((agente, reacao)) => Alergia {
                agente: agente.trim().to_string(),
                reacao: reacao.trim().to_string(),
            },
            None => Alergia {
                agente: entry.to_string(),
                reacao: String::new(),
            },
        })
        .collect()
}

pub fn format_alergias(alergias: &[Alergia]) -> String {
    alergias
        .iter()
        .map(|a| {
            if a.reacao.is_empty() {
                a.agente.clone()
            } else {
                format!("{}: {}", a.agente, a.reacao)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn parse_medicacoes(text: &str) -> Vec<Medicacao> {
    entries(text)
        .map(|entry| {
            let mut parts = entry.splitn(3, '|').map(str::trim);
            Medicacao {
                nome: parts.next().unwrap_or_default().to_string(),
                dose: parts.next().unwrap_or_default().to_string(),
                posologia: parts.next().unwrap_or_default().to_string(),
            }
        })
        .collect()
}

pub fn format_medicacoes(medicacoes: &[Medicacao]) -> String {
    medicacoes
        .iter()
        .map(|m| format!("{} | {} | {}", m.nome, m.dose, m.posologia))
        .collect::<Vec<_>>()
        .join("; ")
}
