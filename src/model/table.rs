use serde::Serialize;

use super::analysis::AnalysisResult;

/// Column headers shared by both tables.
pub const HEADERS: [&str; 3] = ["台湾華語", "日本語訳", "ピンイン"];

pub type Row = [String; 3];

/// Ordered 3-column row collection destined for export.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn push(&mut self, a: &str, b: &str, c: &str) {
        self.rows.push([a.to_string(), b.to_string(), c.to_string()]);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// The two tables accumulated by one run.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RunTables {
    pub sentences: Table,
    pub glossary: Table,
}

impl RunTables {
    pub fn append(&mut self, result: &AnalysisResult) {
        self.sentences
            .push(&result.original, &result.japanese, &result.pinyin);

        for g in &result.glossary {
            self.glossary.push(&g.term, &g.meaning, &g.pinyin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analysis::GlossaryEntry;

    fn result(original: &str, terms: &[&str]) -> AnalysisResult {
        AnalysisResult {
            original: original.to_string(),
            japanese: format!("{original}-ja"),
            pinyin: format!("{original}-py"),
            glossary: terms
                .iter()
                .map(|t| GlossaryEntry {
                    term: t.to_string(),
                    meaning: format!("{t}-m"),
                    pinyin: format!("{t}-p"),
                })
                .collect(),
        }
    }

    #[test]
    fn append_flattens_glossary_in_emission_order() {
        let mut tables = RunTables::default();
        tables.append(&result("一", &["a", "b"]));
        tables.append(&result("二", &["b", "c"]));

        assert_eq!(tables.sentences.len(), 2);
        assert_eq!(tables.sentences.rows[0][0], "一");
        assert_eq!(tables.sentences.rows[1][0], "二");

        let terms: Vec<&str> = tables.glossary.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(terms, vec!["a", "b", "b", "c"]);
        assert_eq!(tables.glossary.rows[1], ["b".to_string(), "b-m".into(), "b-p".into()]);
    }
}
