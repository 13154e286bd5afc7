//! End-to-end tests for analysis and digest flows

#[cfg(test)]
mod tests {
    use crate::{
        default_prompt, AnalysisInput, Analyzer, ChunkBook, Condenser, EngineConfig, EngineError,
        CONTENT_DELIMITER,
    };
    use longread_domain::{
        AnalysisKind, AnalysisRun, ChunkObserver, ChunkStatus, Document, NoopSink, PromptSpec,
        RunStatus,
    };
    use longread_llm::{CallEvent, GenerationError, MockBackend, ReasoningLevel};
    use std::sync::Arc;

    /// Config with tiny chunks so short test texts split
    fn small_config() -> EngineConfig {
        EngineConfig {
            target_chunk_chars: 20,
            min_chunk_chars: 5,
            boundary_window_chars: 10,
            sample_threshold_chars: 60,
            sample_part_chars: 15,
            sample_snap_chars: 5,
            synthesis_max_input_chars: 10_000,
        }
    }

    /// Three paragraphs of under 20 chars each
    const THREE_PARTS: &str = "First part here.\n\nSecond part now.\n\nThird part ends.";

    fn analyzer(backend: &MockBackend) -> Analyzer<MockBackend> {
        Analyzer::new(Arc::new(backend.clone()), small_config()).unwrap()
    }

    /// Text sent to the model, after the delimiter
    fn sent_content(message: &str) -> &str {
        let marker = format!("{}\n\n", CONTENT_DELIMITER);
        let at = message.find(&marker).unwrap();
        &message[at + marker.len()..]
    }

    #[derive(Default)]
    struct Recorder {
        statuses: Vec<(usize, ChunkStatus)>,
        summaries: Vec<(usize, String)>,
    }

    impl ChunkObserver for Recorder {
        fn on_status(&mut self, index: usize, status: ChunkStatus) {
            self.statuses.push((index, status));
        }

        fn on_summary(&mut self, index: usize, total: &str) {
            self.summaries.push((index, total.to_string()));
        }
    }

    #[tokio::test]
    async fn test_empty_document_makes_no_call() {
        let backend = MockBackend::new("never");
        let analyzer = analyzer(&backend);
        let prompt = default_prompt(AnalysisKind::Summary);

        for content in ["", "  \n\t "] {
            let document = Document::new("empty.txt", content);
            let mut run = AnalysisRun::new(AnalysisKind::Summary);

            let result = analyzer
                .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
                .await;

            assert_eq!(result, Err(EngineError::EmptyInput));
            assert_eq!(run.status(), RunStatus::Failed);
            assert!(run.error().is_some());
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_chunk_outline_has_no_synthesis() {
        let backend = MockBackend::new("The outline.");
        let analyzer = analyzer(&backend);
        let document = Document::new("short.txt", "A tiny story.");
        let prompt = default_prompt(AnalysisKind::Outline);
        let mut run = AnalysisRun::new(AnalysisKind::Outline);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 1);
        assert_eq!(run.content(), "The outline.");
        assert_eq!(run.status(), RunStatus::Completed);

        let request = &backend.requests()[0];
        assert_eq!(sent_content(&request.message), "A tiny story.");
        assert_eq!(request.system_instruction, prompt.system);
        assert!(!request.message.contains("Currently analyzing"));
    }

    #[tokio::test]
    async fn test_chunked_outline_runs_parts_then_synthesis() {
        let backend = MockBackend::new("part result").add_response("per-part outlines", "merged");
        let analyzer = analyzer(&backend);
        let document = Document::new("three.txt", THREE_PARTS);
        let prompt = default_prompt(AnalysisKind::Outline);
        let mut run = AnalysisRun::new(AnalysisKind::Outline);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].message.contains("(Currently analyzing part 1/3)"));
        assert!(requests[2].message.contains("(Currently analyzing part 3/3)"));
        assert_eq!(sent_content(&requests[1].message), "Second part now.\n\n");
        assert!(requests.iter().all(|r| r.reasoning == ReasoningLevel::High));

        let content = run.content();
        assert!(content.contains("(3 parts)"));
        assert!(content.contains("### Part 2/3"));
        assert!(content.contains("## Whole-document synthesis"));
        assert!(content.ends_with("merged"));

        // Synthesis reads everything written before its own header
        let synthesis_input = sent_content(&requests[3].message);
        assert_eq!(synthesis_input.matches("part result").count(), 3);
        assert!(!synthesis_input.contains("Whole-document synthesis"));
    }

    #[tokio::test]
    async fn test_chunked_settings_has_no_synthesis() {
        let backend = MockBackend::new("settings");
        let analyzer = analyzer(&backend);
        let document = Document::new("three.txt", THREE_PARTS);
        let prompt = default_prompt(AnalysisKind::Settings);
        let mut run = AnalysisRun::new(AnalysisKind::Settings);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 3);
        assert!(!run.content().contains("synthesis"));
    }

    #[tokio::test]
    async fn test_synthesis_skipped_when_too_long() {
        let backend = MockBackend::new("a fairly long part analysis");
        let config = EngineConfig {
            synthesis_max_input_chars: 50,
            ..small_config()
        };
        let analyzer = Analyzer::new(Arc::new(backend.clone()), config).unwrap();
        let document = Document::new("three.txt", THREE_PARTS);
        let prompt = default_prompt(AnalysisKind::Theme);
        let mut run = AnalysisRun::new(AnalysisKind::Theme);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 3);
        assert!(run.content().contains("synthesis skipped"));
        assert_eq!(run.status(), RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_failure_on_second_part_stops_run() {
        let backend = MockBackend::new("ok")
            .fail_mid_stream(2, "half", GenerationError::Communication("reset".into()));
        let analyzer = analyzer(&backend);
        let document = Document::new("three.txt", THREE_PARTS);
        let prompt = default_prompt(AnalysisKind::Relationships);
        let mut run = AnalysisRun::new(AnalysisKind::Relationships);

        let result = analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await;

        assert!(matches!(result, Err(EngineError::Generation(_))));
        assert_eq!(backend.call_count(), 2);
        assert_eq!(run.status(), RunStatus::Failed);
        assert!(run.error().unwrap().contains("reset"));

        // Part 1 output and the partial part 2 output stay in the transcript
        assert!(run.content().contains("### Part 1/3"));
        assert!(run.content().contains("ok"));
        assert!(run.content().ends_with("half"));
        assert!(!run.content().contains("### Part 3/3"));
    }

    #[tokio::test]
    async fn test_length_error_is_rewritten() {
        let backend = MockBackend::new("ok").fail_on(
            1,
            GenerationError::LengthExceeded("input token count exceeds maximum".into()),
        );
        let analyzer = analyzer(&backend);
        let document = Document::new("short.txt", "Short.");
        let prompt = default_prompt(AnalysisKind::Summary);
        let mut run = AnalysisRun::new(AnalysisKind::Summary);

        let err = analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::LengthExceeded(_)));
        assert!(run.error().unwrap().contains("too long even after chunking"));
    }

    #[tokio::test]
    async fn test_calls_never_overlap() {
        let backend = MockBackend::new("abcdefghijklmnop").with_piece_size(3);
        let analyzer = analyzer(&backend);
        let document = Document::new("three.txt", THREE_PARTS);
        let prompt = default_prompt(AnalysisKind::Outline);
        let mut run = AnalysisRun::new(AnalysisKind::Outline);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        let events = backend.events();
        assert_eq!(events.len(), 8);
        for pair in events.chunks(2) {
            match pair {
                [CallEvent::Started(a), CallEvent::Finished(b)] => assert_eq!(a, b),
                other => panic!("calls interleaved: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_sink_sees_running_totals() {
        let backend = MockBackend::new("abcdef").with_piece_size(2);
        let analyzer = analyzer(&backend);
        let document = Document::new("short.txt", "Short.");
        let prompt = default_prompt(AnalysisKind::Theme);
        let mut run = AnalysisRun::new(AnalysisKind::Theme);

        let mut seen = Vec::new();
        let mut sink = |total: &str| seen.push(total.to_string());
        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut sink)
            .await
            .unwrap();

        assert_eq!(seen, vec!["ab", "abcd", "abcdef"]);
    }

    #[tokio::test]
    async fn test_rerun_resets_content() {
        let backend = MockBackend::new("fresh");
        let analyzer = analyzer(&backend);
        let document = Document::new("short.txt", "Short.");
        let prompt = default_prompt(AnalysisKind::Theme);
        let mut run = AnalysisRun::new(AnalysisKind::Theme);

        for _ in 0..2 {
            analyzer
                .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
                .await
                .unwrap();
        }
        assert_eq!(run.content(), "fresh");
    }

    #[tokio::test]
    async fn test_style_samples_long_documents() {
        let backend = MockBackend::new("style notes");
        let analyzer = analyzer(&backend);
        let text = format!("{}{}{}", "a".repeat(40), "b".repeat(40), "c".repeat(40));
        let document = Document::new("long.txt", text);
        let prompt = default_prompt(AnalysisKind::Style);
        let mut run = AnalysisRun::new(AnalysisKind::Style);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 1);
        let sent = backend.requests()[0].message.clone();
        assert!(sent.contains("characters omitted"));
        assert!(sent_content(&sent).starts_with(&"a".repeat(15)));
        assert!(sent_content(&sent).ends_with(&"c".repeat(15)));
        assert!(run.content().starts_with("*Long document"));
    }

    #[tokio::test]
    async fn test_style_sends_short_documents_whole() {
        let backend = MockBackend::new("style notes");
        let analyzer = analyzer(&backend);
        let document = Document::new("short.txt", "Short and sweet.");
        let prompt = default_prompt(AnalysisKind::Style);
        let mut run = AnalysisRun::new(AnalysisKind::Style);

        analyzer
            .analyze(&mut run, AnalysisInput::new(&document, &prompt), &mut NoopSink)
            .await
            .unwrap();

        assert_eq!(sent_content(&backend.requests()[0].message), "Short and sweet.");
        assert_eq!(run.content(), "style notes");
    }

    #[tokio::test]
    async fn test_condense_then_analyze_from_digest() {
        let backend = MockBackend::new("digest entry")
            .add_response("--- Text to analyze ---\n\n[Part 1]", "from digest");
        let config = small_config();
        let document = Document::new("three.txt", THREE_PARTS);

        let mut book = ChunkBook::split(&document, &config).unwrap();
        assert_eq!(book.len(), 3);

        let condenser = Condenser::with_default_prompt(Arc::new(backend.clone()));
        let report = condenser.condense_pending(&mut book, &mut NoopSink).await;
        assert_eq!(report.completed, vec![0, 1, 2]);
        assert!(report.is_success());
        assert!(book.is_complete());
        assert!(backend
            .requests()
            .iter()
            .all(|r| r.reasoning == ReasoningLevel::Low));

        let analyzer = Analyzer::new(Arc::new(backend.clone()), config).unwrap();
        let prompt = default_prompt(AnalysisKind::PlotHoles);
        let mut run = AnalysisRun::new(AnalysisKind::PlotHoles);
        let input = AnalysisInput::new(&document, &prompt).with_digest(book.digest());
        analyzer.analyze(&mut run, input, &mut NoopSink).await.unwrap();

        assert_eq!(backend.call_count(), 4);
        let last = backend.requests().pop().unwrap();
        assert_eq!(sent_content(&last.message), book.digest().text());
        assert_eq!(last.reasoning, ReasoningLevel::High);
        assert!(run.content().contains("precomputed digest"));
        assert!(run.content().ends_with("from digest"));
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_pass() {
        let backend = MockBackend::new("summary").fail_on(2, GenerationError::RateLimited);
        let document = Document::new("three.txt", THREE_PARTS);
        let mut book = ChunkBook::split(&document, &small_config()).unwrap();
        let condenser = Condenser::with_default_prompt(Arc::new(backend.clone()));
        let mut recorder = Recorder::default();

        let report = condenser.condense_pending(&mut book, &mut recorder).await;

        assert_eq!(report.completed, vec![0, 2]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 1);
        assert_eq!(book.chunk(1).unwrap().status(), ChunkStatus::Failed);
        assert!(!book.is_complete());
        assert!(book.digest().substitute_text().is_none());
        assert_eq!(
            book.digest().text(),
            "[Part 1]\nsummary\n\n---\n\n[Part 3]\nsummary"
        );
        assert!(recorder
            .statuses
            .contains(&(1, ChunkStatus::Failed)));

        // Retrying only touches the failed chunk
        let report = condenser.condense_pending(&mut book, &mut recorder).await;
        assert_eq!(report.completed, vec![1]);
        assert_eq!(report.skipped, vec![0, 2]);
        assert!(book.is_complete());
        assert!(book.digest().substitute_text().is_some());
        assert_eq!(backend.call_count(), 4);
    }

    #[tokio::test]
    async fn test_incomplete_digest_is_ignored() {
        let backend = MockBackend::new("x").fail_on(1, GenerationError::RateLimited);
        let config = small_config();
        let document = Document::new("three.txt", THREE_PARTS);
        let mut book = ChunkBook::split(&document, &config).unwrap();
        let condenser = Condenser::with_default_prompt(Arc::new(backend.clone()));
        condenser.condense_pending(&mut book, &mut NoopSink).await;
        assert_eq!(backend.call_count(), 3);

        let analyzer = Analyzer::new(Arc::new(backend.clone()), config).unwrap();
        let prompt = default_prompt(AnalysisKind::Settings);
        let mut run = AnalysisRun::new(AnalysisKind::Settings);
        let input = AnalysisInput::new(&document, &prompt).with_digest(book.digest());
        analyzer.analyze(&mut run, input, &mut NoopSink).await.unwrap();

        // Falls back to the chunked strategy over the full document
        assert_eq!(backend.call_count(), 6);
        assert!(!run.content().contains("precomputed digest"));
    }

    #[tokio::test]
    async fn test_recondensing_completed_chunk() {
        let backend = MockBackend::new("first").reply_on(4, "second");
        let document = Document::new("three.txt", THREE_PARTS);
        let mut book = ChunkBook::split(&document, &small_config()).unwrap();
        let condenser = Condenser::with_default_prompt(Arc::new(backend.clone()));
        let mut recorder = Recorder::default();

        condenser.condense_pending(&mut book, &mut NoopSink).await;
        condenser
            .condense_chunk(&mut book, 1, &mut recorder)
            .await
            .unwrap();

        assert_eq!(book.chunk(1).unwrap().summary(), "second");
        assert!(book.digest().text().contains("[Part 2]\nsecond"));
        assert_eq!(
            recorder.statuses,
            vec![(1, ChunkStatus::InProgress), (1, ChunkStatus::Completed)]
        );
        assert_eq!(recorder.summaries.last().unwrap(), &(1, "second".to_string()));
    }

    #[tokio::test]
    async fn test_condense_out_of_range() {
        let backend = MockBackend::new("x");
        let mut book = ChunkBook::from_texts(["only"]);
        let condenser = Condenser::new(Arc::new(backend), PromptSpec::new("s", "u"));
        let err = condenser
            .condense_chunk(&mut book, 5, &mut NoopSink)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::ChunkOutOfRange { index: 5, count: 1 });
    }
}
