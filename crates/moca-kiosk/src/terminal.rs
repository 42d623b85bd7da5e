//! Line-oriented presentation of a flow.
//!
//! Each line the respondent types is parsed against the kind of the
//! question on screen. Lines starting with `/` are commands.

use std::io::Write;

use moca_capture::adapters::Input;
use moca_capture::drawing::{PointerEvent, PointerPhase, PointerSource};
use moca_core::models::assessment::{ReviewStatus, TestId, TestResult};
use moca_core::models::question::QuestionKind;
use moca_flow::controller::{BlockReason, FlowController, FlowState};
use moca_flow::countdown::CountdownEvent;
use moca_flow::error::FlowError;
use moca_flow::view::{FlowView, Stage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const HELP: &str = "\
Введите ответ и нажмите Enter.
  Выбор варианта: номер варианта
  Несколько полей: значения через запятую
  Хлопки: пустая строка или «+» на каждый хлопок, затем /next
  Рисунок: точки «x,y x,y ...», затем /next; /clear очищает холст
Команды: /next, /retry, /help, /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Apply the inputs and stay on the question.
    Inputs(Vec<Input>),
    /// Apply the inputs, then advance.
    Answer(Vec<Input>),
    Advance,
    Retry,
    Help,
    Quit,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Submitted(TestId),
    /// The respondent quit or input ended before submission.
    Abandoned,
}

pub fn parse(line: &str, kind: Option<QuestionKind>) -> Result<Command, String> {
    let trimmed = line.trim();
    if let Some(command) = trimmed.strip_prefix('/') {
        return match command {
            "next" => Ok(Command::Advance),
            "retry" => Ok(Command::Retry),
            "help" => Ok(Command::Help),
            "quit" => Ok(Command::Quit),
            "clear" => Ok(Command::Inputs(vec![Input::ClearDrawing])),
            other => Err(format!("неизвестная команда: /{other}")),
        };
    }

    let Some(kind) = kind else {
        return Err("нет активного вопроса".into());
    };

    match kind {
        QuestionKind::FreeText | QuestionKind::TimedRecall | QuestionKind::VoiceRecorded => {
            Ok(Command::Answer(vec![Input::Text(line.to_string())]))
        }
        QuestionKind::SingleChoice => match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Command::Answer(vec![Input::Choice(n - 1)])),
            _ => Err("введите номер варианта".into()),
        },
        QuestionKind::MultiField => Ok(Command::Answer(
            line.split(',')
                .enumerate()
                .map(|(index, text)| Input::Field {
                    index,
                    text: text.trim().to_string(),
                })
                .collect(),
        )),
        QuestionKind::TapGesture => {
            if trimmed.chars().any(|c| c != '+') {
                return Err("пустая строка или «+» на каждый хлопок, затем /next".into());
            }
            let taps = trimmed.chars().count().max(1);
            Ok(Command::Inputs(vec![Input::Tap; taps]))
        }
        QuestionKind::Drawing => parse_stroke(trimmed).map(Command::Inputs),
    }
}

/// `x,y x,y ...` in canvas pixels, as one continuous stroke.
fn parse_stroke(text: &str) -> Result<Vec<Input>, String> {
    let points = text
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("ожидалась точка x,y: {pair}"))?;
            let x = x.parse::<f32>().map_err(|e| format!("{pair}: {e}"))?;
            let y = y.parse::<f32>().map_err(|e| format!("{pair}: {e}"))?;
            Ok((x, y))
        })
        .collect::<Result<Vec<_>, String>>()?;

    if points.len() < 2 {
        return Err("линия должна содержать хотя бы две точки".into());
    }

    let pointer = |phase, (x, y): (f32, f32)| {
        Input::Pointer(PointerEvent {
            source: PointerSource::Mouse,
            phase,
            x,
            y,
        })
    };
    let mut inputs = vec![pointer(PointerPhase::Down, points[0])];
    inputs.extend(points[1..].iter().map(|p| pointer(PointerPhase::Move, *p)));
    inputs.push(pointer(PointerPhase::Up, points[points.len() - 1]));
    Ok(inputs)
}

pub fn render(view: &FlowView) -> String {
    let mut out = String::new();
    match view.stage {
        Stage::NotStarted => out.push_str("Тест MoCA\n"),
        Stage::Question => {
            if let Some(question) = &view.question {
                out.push_str(&format!(
                    "[{}/{}] {}\n{}\n",
                    view.position, view.total, question.heading, question.prompt
                ));
                for (n, option) in question.options.iter().enumerate() {
                    out.push_str(&format!("  {}. {option}\n", n + 1));
                }
                if question.fields > 0 {
                    out.push_str(&format!("Полей для ответа: {}\n", question.fields));
                }
            }
            if let Some(remaining) = view.countdown {
                out.push_str(&countdown_line(remaining));
                out.push('\n');
            }
        }
        Stage::Submitting => out.push_str("Отправка теста...\n"),
        Stage::Submitted => {
            if let Some(id) = &view.test_id {
                out.push_str(&format!("Тест отправлен. ID теста: {id}\n"));
            }
            if let Some(score) = &view.score {
                out.push_str(&format!(
                    "Предварительный балл: {}/{} ({})\n",
                    score.provisional_points,
                    score.max_points,
                    score.interpretation().description()
                ));
            }
        }
        Stage::SubmissionFailed => {}
    }
    if let Some(message) = &view.message {
        out.push_str(&format!("! {message}\n"));
    }
    if let Some(action) = &view.primary_action {
        out.push_str(&format!("> {action}\n"));
    }
    out
}

pub fn countdown_line(remaining: u32) -> String {
    format!("Осталось времени: {remaining} секунд")
}

pub fn render_result(result: &TestResult, max_points: u32) -> String {
    match result.review() {
        ReviewStatus::Pending => format!(
            "Тест {} от {}: результат ожидает проверки специалистом",
            result.test_id, result.date_of_test
        ),
        ReviewStatus::Reviewed {
            points,
            interpretation,
        } => format!(
            "Тест {} от {}: {points}/{max_points} баллов ({})",
            result.test_id,
            result.date_of_test,
            interpretation.description()
        ),
    }
}

/// Drive `flow` from `input` until the test is submitted or input ends.
pub async fn run<R, W>(flow: &mut FlowController, input: R, out: &mut W) -> eyre::Result<Outcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if *flow.state() == FlowState::Idle {
        flow.start().await?;
    }
    write!(out, "{}", render(&flow.view()))?;

    let mut lines = input.lines();
    loop {
        if let FlowState::Submitted { test_id, .. } = flow.state() {
            info!(test_id = %test_id, "session complete");
            return Ok(Outcome::Submitted(test_id.clone()));
        }

        let position = flow.view().position;
        tokio::select! {
            event = flow.next_countdown_event() => {
                flow.handle_countdown(event).await?;
                let view = flow.view();
                if view.position != position {
                    write!(out, "{}", render(&view))?;
                } else if let CountdownEvent::Tick { remaining, .. } = event {
                    writeln!(out, "{}", countdown_line(remaining))?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    flow.teardown().await;
                    return Ok(Outcome::Abandoned);
                };
                let kind = flow.current_question().map(|q| q.kind);
                let command = match parse(&line, kind) {
                    Ok(Command::Help) => {
                        writeln!(out, "{HELP}")?;
                        continue;
                    }
                    Ok(command) => command,
                    Err(message) => {
                        writeln!(out, "! {message}")?;
                        continue;
                    }
                };
                match apply(flow, command).await {
                    Ok(Some(outcome)) => return Ok(outcome),
                    Ok(None) => {}
                    Err(FlowError::QuestionNotFound(index)) => {
                        return Err(FlowError::QuestionNotFound(index).into());
                    }
                    Err(e) => {
                        writeln!(out, "! {e}")?;
                        continue;
                    }
                }
                let view = flow.view();
                if view.position != position || view.stage != Stage::Question || view.message.is_some() {
                    write!(out, "{}", render(&view))?;
                }
            }
        }
    }
}

async fn apply(flow: &mut FlowController, command: Command) -> Result<Option<Outcome>, FlowError> {
    match command {
        Command::Inputs(inputs) => {
            for input in inputs {
                flow.input(input)?;
            }
        }
        Command::Answer(inputs) => {
            for input in inputs {
                flow.input(input)?;
            }
            flow.advance().await?;
        }
        Command::Advance => flow.advance().await?,
        Command::Retry => match flow.state() {
            FlowState::Blocked {
                reason: BlockReason::DeviceUnavailable(_),
                ..
            } => flow.retry_acquisition().await?,
            FlowState::Blocked {
                reason: BlockReason::UploadFailed(_),
                ..
            } => flow.advance().await?,
            FlowState::SubmissionFailed { .. } => flow.retry_submission().await?,
            other => {
                return Err(FlowError::InvalidState {
                    action: "retry",
                    state: other.name(),
                });
            }
        },
        Command::Help => {}
        Command::Quit => {
            flow.teardown().await;
            return Ok(Some(Outcome::Abandoned));
        }
    }
    Ok(None)
}
