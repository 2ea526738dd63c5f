// ==========================================
// SIGLAB Aviário - 快报提示词
// ==========================================
// 输入: 已筛选的日产记录 + 筛选条件
// 输出: 葡语提示词（DESEMPENHO GERAL / ANÁLISE DE OCORRÊNCIAS / RECOMENDAÇÃO RÁPIDA）
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::engine::filter::RecordFilter;
use crate::report::error::ReportResult;
use serde::Serialize;

/// 无备注时写入的占位文本
pub const NO_NOTES_PLACEHOLDER: &str = "Nenhuma observação registrada";

/// 提示词中的单日数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub data: String,
    pub aviario: String,
    pub ovos: u32,
    pub postura: String,
    pub mortes: u32,
    pub notas: String,
}

impl From<&ProductionRecord> for ReportRow {
    fn from(r: &ProductionRecord) -> Self {
        let notes = r.notes.trim();
        Self {
            data: r.date.to_string(),
            aviario: r.aviary_id.to_string(),
            ovos: r.metrics.total_eggs,
            postura: format!("{}%", r.metrics.laying_rate),
            mortes: r.mortality,
            notas: if notes.is_empty() {
                NO_NOTES_PLACEHOLDER.to_string()
            } else {
                notes.to_string()
            },
        }
    }
}

pub fn build_report_rows(records: &[ProductionRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}

/// 构建快报提示词
pub fn build_prompt(rows: &[ReportRow], filters: &RecordFilter) -> ReportResult<String> {
    let rows_json = serde_json::to_string(rows)?;
    let filters_json = serde_json::to_string(filters)?;

    Ok(format!(
        r#"Você é um Consultor Técnico de Avicultura de Postura.
Gere um RELATÓRIO EXPRESSO (curto e direto) baseado nos dados abaixo.

DADOS DE PRODUÇÃO (Data, Aviário, Ovos, Taxa %, Mortalidade, Notas de Manejo):
{rows_json}

FILTROS APLICADOS:
{filters_json}

INSTRUÇÕES DE FORMATO:
1. Use linguagem técnica mas extremamente concisa.
2. Foque no cruzamento de dados: se houve queda de postura ou aumento de mortalidade, busque a explicação nas "Notas de Manejo/Observações" fornecidas.
3. Use Markdown.

ESTRUTURA DO RELATÓRIO:
- **DESEMPENHO GERAL**: (Métricas principais em uma linha).
- **ANÁLISE DE OCORRÊNCIAS**: (Relacione as quedas/picos com as observações registradas no campo 'Notas').
- **RECOMENDAÇÃO RÁPIDA**: (Ação imediata baseada no que foi observado).

Língua: Português Brasileiro. Seja rápido e evite introduções longas.
"#
    ))
}
