use monk_core::{ChannelChunkStream, Confidence, ProviderError, StrategyKind, StreamEvent, VecChunkStream};
use monk_interpreter::{interpret, Interpreter, InterpreterConfig, Segment};
use proptest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_show_file_scenario() {
    let input = "Sure.\n{\"action\":\"show_file\",\"parameters\":{\"filepath\":\"a.py\"}}\nDone.";
    let mut stream = VecChunkStream::new([input]);
    let result = interpret(&mut stream, &InterpreterConfig::default()).await.unwrap();

    assert_eq!(result.segments.len(), 3);
    assert_eq!(result.segments[0], Segment::Text("Sure.\n".into()));
    let candidate = result.segments[1].as_tool_call().unwrap();
    let fields = candidate.fields.as_ref().unwrap();
    assert_eq!(fields.name, "show_file");
    assert_eq!(fields.parameters["filepath"], "a.py");
    assert_eq!(candidate.strategy, StrategyKind::Strict);
    assert_eq!(candidate.confidence, Confidence::High);
    assert_eq!(result.segments[2], Segment::Text("\nDone.".into()));
    assert_eq!(result.reconstruct(), input);
}

#[test]
fn test_truncated_call_waits_for_completion() {
    let mut interpreter = Interpreter::new(&InterpreterConfig::default());

    let first = interpreter.feed("{\"action\":\"create_file\",\"paramet");
    assert!(first.iter().all(Segment::is_text));
    assert!(first.is_empty());

    let second = interpreter.feed("ers\":{\"filepath\":\"b.txt\",\"content\":\"x\"}}");
    let candidates: Vec<_> = second.iter().filter_map(Segment::as_tool_call).collect();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name(), Some("create_file"));
    assert!(interpreter.finish().is_empty());
}

#[tokio::test]
async fn test_normalized_recovery_over_channel() {
    let (tx, mut stream) = ChannelChunkStream::channel(8);
    tokio::spawn(async move {
        for chunk in ["ok ", "{\u{201C}tool\u{201D}: \u{201C}finish\u{201D}", ",}"] {
            tx.send(Ok(StreamEvent::Chunk(chunk.into()))).await.unwrap();
        }
        tx.send(Ok(StreamEvent::End)).await.unwrap();
    });

    let result = interpret(&mut stream, &InterpreterConfig::default()).await.unwrap();
    assert_eq!(result.candidate_count(), 1);
    let candidate = result.segments[1].as_tool_call().unwrap();
    assert_eq!(candidate.strategy, StrategyKind::Normalized);
    assert_eq!(candidate.name(), Some("finish"));
    assert!(result.diagnostics.is_empty());
}

#[tokio::test]
async fn test_provider_error_is_returned() {
    let (tx, mut stream) = ChannelChunkStream::channel(2);
    tx.send(Ok(StreamEvent::Chunk("partial {".into()))).await.unwrap();
    tx.send(Err(ProviderError::Transport("reset".into()))).await.unwrap();

    let err = interpret(&mut stream, &InterpreterConfig::default()).await.unwrap_err();
    assert_eq!(err, ProviderError::Transport("reset".into()));
}

#[tokio::test]
async fn test_intent_inference_opt_in() {
    let input = "{run ls -la}";
    let disabled = interpret(&mut VecChunkStream::new([input]), &InterpreterConfig::default())
        .await
        .unwrap();
    assert_eq!(disabled.candidate_count(), 0);
    assert_eq!(disabled.diagnostics.len(), 1);

    let config = InterpreterConfig {
        enable_intent_inference: true,
        ..InterpreterConfig::default()
    };
    let enabled = interpret(&mut VecChunkStream::new([input]), &config).await.unwrap();
    let candidate = enabled.segments[0].as_tool_call().unwrap();
    assert_eq!(candidate.strategy, StrategyKind::IntentInference);
    assert_eq!(candidate.confidence, Confidence::Low);
}

fn text_piece() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,:!\n]{0,24}"
}

fn call_piece() -> impl Strategy<Value = String> {
    ("[a-z_]{1,12}", "[a-z]{1,8}", "[a-zA-Z0-9 ./{}\"]{0,16}")
        .prop_map(|(name, key, value)| json!({"action": name, "parameters": {key: value}}).to_string())
}

fn split(source: &str, cuts: &[usize]) -> Vec<String> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (source.len() + 1)).collect();
    points.push(0);
    points.push(source.len());
    points.sort_unstable();
    points.dedup();
    points.windows(2).map(|w| source[w[0]..w[1]].to_string()).collect()
}

proptest! {
    #[test]
    fn prop_n_spans_yield_n_candidates(
        pieces in prop::collection::vec((text_piece(), call_piece()), 0..6),
        tail in text_piece(),
        cuts in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let mut source = String::new();
        for (text, call) in &pieces {
            source.push_str(text);
            source.push_str(call);
        }
        source.push_str(&tail);

        let mut interpreter = Interpreter::new(&InterpreterConfig::default());
        let mut segments = Vec::new();
        for chunk in split(&source, &cuts) {
            segments.extend(interpreter.feed(&chunk));
        }
        segments.extend(interpreter.finish());

        let candidates = segments.iter().filter(|s| !s.is_text()).count();
        prop_assert_eq!(candidates, pieces.len());
        let rebuilt: String = segments.iter().map(Segment::source).collect();
        prop_assert_eq!(rebuilt, source);
    }

    #[test]
    fn prop_arbitrary_text_is_never_lost(
        source in "[ -~\n]{0,64}",
        cuts in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let mut interpreter = Interpreter::new(&InterpreterConfig::default());
        let mut segments = Vec::new();
        for chunk in split(&source, &cuts) {
            segments.extend(interpreter.feed(&chunk));
        }
        segments.extend(interpreter.finish());

        let rebuilt: String = segments.iter().map(Segment::source).collect();
        prop_assert_eq!(rebuilt, source);
    }
}
