use std::path::Path;
use std::sync::{Arc, Mutex};

use moca_capture::adapters::Input;
use moca_capture::drawing::PointerPhase;
use moca_core::BoxFuture;
use moca_core::models::answer::AnswerPackage;
use moca_core::models::assessment::{TestId, TestResult};
use moca_core::models::media::AudioClip;
use moca_core::models::question::QuestionKind;
use moca_flow::config::FlowConfig;
use moca_flow::controller::{FlowController, FlowServices};
use moca_instruments::get_instrument;
use moca_kiosk::microphone::MicrophoneSource;
use moca_kiosk::terminal::{self, Command, Outcome, parse};
use moca_storage::assessments::AssessmentStore;
use moca_storage::error::StorageError;
use moca_storage::media::MediaStore;

#[derive(Default)]
struct RecordingStore {
    submissions: Mutex<Vec<AnswerPackage>>,
    uploads: Mutex<Vec<AudioClip>>,
}

impl AssessmentStore for RecordingStore {
    fn submit<'a>(
        &'a self,
        package: &'a AnswerPackage,
    ) -> BoxFuture<'a, Result<TestId, StorageError>> {
        Box::pin(async move {
            self.submissions.lock().unwrap().push(package.clone());
            Ok(TestId::new("17"))
        })
    }

    fn fetch_result<'a>(&'a self, id: &'a TestId) -> BoxFuture<'a, Result<TestResult, StorageError>> {
        Box::pin(async move { Err(StorageError::NotFound { id: id.to_string() }) })
    }
}

impl MediaStore for RecordingStore {
    fn upload_audio<'a>(&'a self, clip: &'a AudioClip) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            self.uploads.lock().unwrap().push(clip.clone());
            Ok("audio/tapping.wav".to_string())
        })
    }
}

fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..8_000 {
        writer.write_sample((n % 100) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn flow(microphone: &MicrophoneSource, store: Arc<RecordingStore>) -> FlowController {
    let services = FlowServices {
        capability: microphone.capability(),
        assessments: store.clone(),
        media: store,
    };
    FlowController::new(get_instrument("moca").unwrap(), services, FlowConfig::default()).unwrap()
}

#[test]
fn commands_parse_regardless_of_question() {
    assert_eq!(parse(" /next ", None), Ok(Command::Advance));
    assert_eq!(parse("/retry", Some(QuestionKind::FreeText)), Ok(Command::Retry));
    assert_eq!(parse("/quit", None), Ok(Command::Quit));
    assert_eq!(
        parse("/clear", Some(QuestionKind::Drawing)),
        Ok(Command::Inputs(vec![Input::ClearDrawing]))
    );
    assert!(parse("/dance", None).is_err());
    assert!(parse("ответ", None).is_err());
}

#[test]
fn lines_parse_by_question_kind() {
    assert_eq!(
        parse("лист, перо", Some(QuestionKind::TimedRecall)),
        Ok(Command::Answer(vec![Input::Text("лист, перо".into())]))
    );
    assert_eq!(
        parse("2", Some(QuestionKind::SingleChoice)),
        Ok(Command::Answer(vec![Input::Choice(1)]))
    );
    assert!(parse("0", Some(QuestionKind::SingleChoice)).is_err());
    assert_eq!(
        parse("лев , носорог,верблюд", Some(QuestionKind::MultiField)),
        Ok(Command::Answer(vec![
            Input::Field { index: 0, text: "лев".into() },
            Input::Field { index: 1, text: "носорог".into() },
            Input::Field { index: 2, text: "верблюд".into() },
        ]))
    );
    assert_eq!(
        parse("", Some(QuestionKind::TapGesture)),
        Ok(Command::Inputs(vec![Input::Tap]))
    );
    assert_eq!(
        parse("+++", Some(QuestionKind::TapGesture)),
        Ok(Command::Inputs(vec![Input::Tap; 3]))
    );
    assert!(parse("хлоп", Some(QuestionKind::TapGesture)).is_err());
}

#[test]
fn stroke_becomes_down_moves_up() {
    let Ok(Command::Inputs(inputs)) = parse("10,10 20,20 30,10", Some(QuestionKind::Drawing))
    else {
        panic!("expected pointer inputs");
    };
    let phases: Vec<PointerPhase> = inputs
        .iter()
        .map(|input| match input {
            Input::Pointer(event) => event.phase,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            PointerPhase::Down,
            PointerPhase::Move,
            PointerPhase::Move,
            PointerPhase::Up
        ]
    );

    assert!(parse("10,10", Some(QuestionKind::Drawing)).is_err());
    assert!(parse("10;10 20,20", Some(QuestionKind::Drawing)).is_err());
}

#[test]
fn pending_and_reviewed_results_render_differently() {
    let pending: TestResult =
        serde_json::from_str(r#"{"test_id": 3, "date_of_test": "2024-03-05", "points": null}"#)
            .unwrap();
    let rendered = terminal::render_result(&pending, 30);
    assert!(rendered.contains("ожидает проверки"));
    assert!(!rendered.contains("0/30"));

    let reviewed: TestResult =
        serde_json::from_str(r#"{"test_id": 3, "date_of_test": "2024-03-05", "points": 24}"#)
            .unwrap();
    let rendered = terminal::render_result(&reviewed, 30);
    assert!(rendered.contains("24/30"));
    assert!(rendered.contains("Легкие когнитивные нарушения"));
}

#[tokio::test]
async fn scripted_session_submits_through_the_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("voice.wav");
    write_wav(&wav);

    let store = Arc::new(RecordingStore::default());
    let microphone = MicrophoneSource::Wav { path: wav };
    let mut flow = flow(&microphone, store.clone());

    let script = "\
дата месяц год день город учреждение
лист церковь цветок перо красный

582
741
+
+
+
/next
никаких если, и или но
лев, носорог, верблюд
фрукты
10,10 60,60 90,20
/next
лист
2
";
    let mut out = Vec::new();
    let outcome = terminal::run(&mut flow, script.as_bytes(), &mut out)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Submitted(TestId::new("17")));

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("[1/11]"));
    assert!(printed.contains("[11/11]"));
    assert!(printed.contains("Тест отправлен. ID теста: 17"));
    assert!(printed.contains("Предварительный балл: 27/30"));

    let submissions = store.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].len(), 11);
    assert_eq!(
        submissions[0].get(5).and_then(|a| a.media_ref()),
        Some("audio/tapping.wav")
    );
    // The repetition question records too when a microphone is present.
    assert_eq!(store.uploads.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn blank_answer_is_reprompted() {
    let store = Arc::new(RecordingStore::default());
    let mut flow = flow(&MicrophoneSource::Disabled, store.clone());

    let mut out = Vec::new();
    let outcome = terminal::run(&mut flow, "   \n/quit\n".as_bytes(), &mut out)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Abandoned);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Пожалуйста, заполните ответ"));
    assert!(store.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn required_microphone_without_a_source_blocks_the_session() {
    let store = Arc::new(RecordingStore::default());
    let mut flow = flow(&MicrophoneSource::Disabled, store.clone());

    let script = "дата\nлист\n582\n741\n+\n/next\n/retry\n";
    let mut out = Vec::new();
    let outcome = terminal::run(&mut flow, script.as_bytes(), &mut out)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Abandoned);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("[5/11]"));
    assert!(printed.contains("Микрофон недоступен"));
    assert!(!printed.contains("[6/11]"));
    assert_eq!(flow.answers().len(), 4);
}

#[test]
fn unreadable_wav_source_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.wav");
    let capability = MicrophoneSource::Wav { path }.capability();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    assert!(runtime.block_on(capability.acquire_microphone()).is_err());
}
