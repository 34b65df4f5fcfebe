use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::CoreError;
use crate::model::choice::ModelChoice;
use crate::model::notice::{Notice, NoticeLevel};
use crate::services::ai::CompletionBackend;
use crate::services::analyzer::{self, AnalysisRun};
use crate::services::export::{self, Artifact};
use crate::services::input;

const ERROR_PREFIX: &str = "エラーが発生しました";
const DONE_MESSAGE: &str = "ファイル生成完了！以下からダウンロードできます：";

/// Configuration plus the endpoint used for every run of this process.
pub struct Session {
    config: AppConfig,
    backend: Box<dyn CompletionBackend>,
}

/// Everything the front end shows after one trigger.
#[derive(Debug)]
pub struct RunReport {
    pub notices: Vec<Notice>,
    pub run: Option<AnalysisRun>,
    pub artifacts: Vec<Artifact>,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    fn halted(notices: Vec<Notice>) -> Self {
        RunReport {
            notices,
            run: None,
            artifacts: Vec::new(),
            written: Vec::new(),
        }
    }

    /// The most severe notice level of the run.
    pub fn outcome(&self) -> NoticeLevel {
        if self.has(NoticeLevel::Error) {
            NoticeLevel::Error
        } else if self.has(NoticeLevel::Warning) {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Success
        }
    }

    fn has(&self, level: NoticeLevel) -> bool {
        self.notices.iter().any(|n| n.level == level)
    }
}

impl Session {
    pub fn new(config: AppConfig, backend: Box<dyn CompletionBackend>) -> Self {
        Session { config, backend }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// One trigger: validate, analyze every line, export. Any failure
    /// leaves the report without rows or artifacts.
    pub fn analyze(&self, text: &str, choice: ModelChoice, output_dir: Option<&Path>) -> RunReport {
        let lines = match input::collect(text) {
            Ok(lines) => lines,
            Err(e) => return RunReport::halted(vec![Notice::warning(e.to_string())]),
        };

        let model = choice.model_id(&self.config);
        let mut notices = vec![Notice::info(format!(
            "{} で解析中...（{} 文）",
            choice.label(),
            lines.len()
        ))];

        let result = analyzer::run(self.backend.as_ref(), model, &lines).and_then(|run| {
            let artifacts = export::build_artifacts(&run.tables)?;
            let written = match output_dir {
                Some(dir) => export::write_artifacts(dir, &artifacts)?,
                None => Vec::new(),
            };
            Ok::<_, CoreError>((run, artifacts, written))
        });

        match result {
            Ok((run, artifacts, written)) => {
                notices.push(Notice::success(DONE_MESSAGE));
                RunReport {
                    notices,
                    run: Some(run),
                    artifacts,
                    written,
                }
            }
            Err(e) => {
                notices.push(Notice::error(format!("{ERROR_PREFIX}: {e}")));
                RunReport::halted(notices)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyzer::tests::{ScriptedBackend, HELLO, THANKS};
    use crate::services::export::{GLOSSARY_CSV_FILE, SENTENCES_CSV_FILE, XLSX_FILE};
    use std::rc::Rc;

    struct Shared(Rc<ScriptedBackend>);

    impl CompletionBackend for Shared {
        fn complete(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<String, crate::error::AnalysisError> {
            self.0.complete(model, prompt)
        }
    }

    fn session(replies: Vec<Result<&str, &str>>) -> (Session, Rc<ScriptedBackend>) {
        let backend = Rc::new(ScriptedBackend::new(replies));
        let s = Session::new(AppConfig::default(), Box::new(Shared(backend.clone())));
        (s, backend)
    }

    fn errors(report: &RunReport) -> usize {
        report
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count()
    }

    #[test]
    fn two_line_scenario() {
        let (s, backend) = session(vec![Ok(HELLO), Ok(THANKS)]);
        let report = s.analyze("你好\n謝謝", ModelChoice::Primary, None);

        assert_eq!(report.outcome(), NoticeLevel::Success);
        assert_eq!(report.notices[0].message, "GPT-4 で解析中...（2 文）");
        assert_eq!(report.notices[1].message, DONE_MESSAGE);

        let run = report.run.as_ref().unwrap();
        assert_eq!(run.tables.sentences.len(), 2);
        assert_eq!(run.tables.glossary.len(), 2);

        let names: Vec<&str> = report.artifacts.iter().map(|a| a.file_name).collect();
        assert_eq!(names, vec![XLSX_FILE, SENTENCES_CSV_FILE, GLOSSARY_CSV_FILE]);

        for a in &report.artifacts[1..] {
            let text = std::str::from_utf8(&a.bytes[3..]).unwrap();
            assert_eq!(text.lines().count(), 3);
        }
        assert!(report.written.is_empty());
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn plain_text_reply_yields_single_error_and_nothing_else() {
        let (s, backend) = session(vec![Ok("sorry, error")]);
        let report = s.analyze("你好", ModelChoice::Primary, None);

        assert_eq!(report.outcome(), NoticeLevel::Error);
        assert_eq!(errors(&report), 1);
        assert!(report.notices.last().unwrap().message.starts_with("エラーが発生しました: "));
        assert!(report.run.is_none());
        assert!(report.artifacts.is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn failure_mid_batch_stops_submission() {
        let (s, backend) = session(vec![Ok(HELLO), Err("connection reset"), Ok(THANKS)]);
        let report = s.analyze("你好\n壞\n謝謝", ModelChoice::Secondary, None);

        assert_eq!(errors(&report), 1);
        assert!(report.notices[1].message.contains("connection reset"));
        assert!(report.run.is_none());
        assert_eq!(backend.calls(), 2);
        assert!(backend.models.borrow().iter().all(|m| m == "gpt-3.5-turbo"));
    }

    #[test]
    fn empty_text_warns_without_calling_endpoint() {
        let (s, backend) = session(vec![Ok(HELLO)]);
        let report = s.analyze("  \n ", ModelChoice::Primary, None);

        assert_eq!(report.outcome(), NoticeLevel::Warning);
        assert_eq!(report.notices, vec![Notice::warning("文章を入力してください")]);
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn writes_artifacts_when_asked() {
        let dir = std::env::temp_dir().join(format!("huayu-session-{}", std::process::id()));
        let (s, _) = session(vec![Ok(HELLO)]);
        let report = s.analyze("你好", ModelChoice::Primary, Some(&dir));

        assert_eq!(report.written.len(), 3);
        assert!(report.written.iter().all(|p| p.exists()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_failure_reports_error_and_removes_partial_files() {
        let dir = std::env::temp_dir().join(format!("huayu-session-fail-{}", std::process::id()));
        std::fs::create_dir_all(dir.join(SENTENCES_CSV_FILE)).unwrap();
        let (s, _) = session(vec![Ok(HELLO)]);
        let report = s.analyze("你好", ModelChoice::Primary, Some(&dir));

        assert_eq!(report.outcome(), NoticeLevel::Error);
        assert_eq!(errors(&report), 1);
        assert!(report.artifacts.is_empty());
        assert!(report.written.is_empty());
        assert!(!dir.join(XLSX_FILE).exists());
        assert!(!dir.join(GLOSSARY_CSV_FILE).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
