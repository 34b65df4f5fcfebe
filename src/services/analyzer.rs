use serde::Serialize;

use crate::error::CoreError;
use crate::model::analysis::AnalysisResult;
use crate::model::table::RunTables;
use crate::services::ai::{self, CompletionBackend};

#[derive(Debug, Serialize)]
pub struct AnalysisRun {
    pub results: Vec<AnalysisResult>,
    pub tables: RunTables,
}

/// Analyzes every line in order, one blocking call per line. The first
/// failure aborts the run and discards everything gathered so far.
pub fn run(
    backend: &dyn CompletionBackend,
    model: &str,
    lines: &[&str],
) -> Result<AnalysisRun, CoreError> {
    let mut results: Vec<AnalysisResult> = Vec::with_capacity(lines.len());
    let mut tables = RunTables::default();

    tracing::info!(model, sentences = lines.len(), "starting analysis run");

    for (i, line) in lines.iter().enumerate() {
        let ln = i + 1;

        let payload = match ai::analyze_sentence(backend, model, line) {
            Ok(p) => p,
            Err(source) => {
                tracing::warn!(line = ln, error = %source, "analysis aborted");
                return Err(CoreError::Analysis { line: ln, source });
            }
        };

        let result = AnalysisResult::from_payload(line, payload);
        tables.append(&result);
        results.push(result);

        tracing::info!(line = ln, total = lines.len(), "sentence analyzed");
    }

    tracing::info!(
        sentences = tables.sentences.len(),
        glossary = tables.glossary.len(),
        "analysis run finished"
    );

    Ok(AnalysisRun { results, tables })
}
