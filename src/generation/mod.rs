//! Generation panel: three numeric fields in, one generated position out.
//!
//! [`GenerationPanel::on_generate_clicked`] runs the whole click handler:
//! validate, lock the trigger, call `POST /api/generate`, render the report
//! or the error, unlock the trigger. The steps run strictly in that order and
//! the unlock happens whatever the outcome.
//!
//! There is no timeout and no cancellation. The "up to two minutes" notice
//! is informational; a second click during a request is only prevented by
//! the disabled trigger.

pub mod format;
pub mod links;

use std::time::Duration;

use crate::api::ApiClient;
use crate::api::protocol::{GenerationRequest, PositionReport};
use crate::error::ValidationError;
use crate::messages::Messages;
use crate::page::host::Host;
use crate::page::{Document, Element, StatusKind};

use format::{format_number, format_seconds, format_thousands};
use links::AnalysisLinks;

/// Element ids mounted by the panel.
pub mod ids {
    pub const TARGET_MIN: &str = "targetMin";
    pub const TARGET_MAX: &str = "targetMax";
    pub const MAX_ATTEMPTS: &str = "maxAttempts";
    pub const GENERATE_BTN: &str = "generateBtn";
    pub const BTN_TEXT: &str = "btnText";
    pub const LOADER: &str = "loader";
    pub const STATUS: &str = "status";
    pub const RESULTS: &str = "results";
    pub const FEN: &str = "fen";
    pub const WHITE_MATERIAL: &str = "whiteMaterial";
    pub const BLACK_MATERIAL: &str = "blackMaterial";
    pub const MATERIAL_DIFF: &str = "materialDiff";
    pub const TURN: &str = "turn";
    pub const EVAL_LINE1: &str = "evalLine1";
    pub const EVAL_LINE2: &str = "evalLine2";
    pub const ATTEMPTS: &str = "attempts";
    pub const TIME: &str = "time";
    pub const LICHESS_LINK: &str = "lichessLink";
    pub const CHESSCOM_LINK: &str = "chesscomLink";
    pub const COPY_FEN_BTN: &str = "copyFenBtn";
}

/// How long the copy button shows its confirmation label.
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

/// How a click on the generate button ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Inputs were invalid; nothing was sent and the UI was left as is.
    Rejected(ValidationError),
    Generated(PositionReport),
    /// The backend answered `success: false` with this error.
    ServerError(String),
    /// The request or its response was unusable.
    TransportFailed(String),
}

pub struct GenerationPanel {
    messages: Messages,
}

impl GenerationPanel {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    /// Insert the panel's elements in their idle state.
    pub fn mount(&self, doc: &mut Document) {
        doc.insert(ids::TARGET_MIN, Element::input(""));
        doc.insert(ids::TARGET_MAX, Element::input(""));
        doc.insert(ids::MAX_ATTEMPTS, Element::input(""));
        doc.insert(ids::GENERATE_BTN, Element::new());
        doc.insert(
            ids::BTN_TEXT,
            Element::with_text(self.messages.generate_label()),
        );
        doc.insert(ids::LOADER, Element::new().hidden());
        doc.insert(ids::STATUS, Element::new().hidden());
        doc.insert(ids::RESULTS, Element::new().hidden());
        for id in [
            ids::FEN,
            ids::WHITE_MATERIAL,
            ids::BLACK_MATERIAL,
            ids::MATERIAL_DIFF,
            ids::TURN,
            ids::EVAL_LINE1,
            ids::EVAL_LINE2,
            ids::ATTEMPTS,
            ids::TIME,
        ] {
            doc.insert(id, Element::new());
        }
        doc.insert(ids::LICHESS_LINK, Element::link("#", "Lichess"));
        doc.insert(ids::CHESSCOM_LINK, Element::link("#", "Chess.com"));
        doc.insert(
            ids::COPY_FEN_BTN,
            Element::with_text(self.messages.copy_fen_label()),
        );
    }

    /// Type raw text into the three form fields.
    pub fn fill_form(doc: &mut Document, target_min: &str, target_max: &str, max_attempts: &str) {
        doc.set_value(ids::TARGET_MIN, target_min);
        doc.set_value(ids::TARGET_MAX, target_max);
        doc.set_value(ids::MAX_ATTEMPTS, max_attempts);
    }

    /// Parse the form into a request.
    pub fn read_request(doc: &Document) -> Result<GenerationRequest, ValidationError> {
        let target_min = parse_field(doc, ids::TARGET_MIN, "target_min")?;
        let target_max = parse_field(doc, ids::TARGET_MAX, "target_max")?;
        let max_attempts = parse_field(doc, ids::MAX_ATTEMPTS, "max_attempts")?;
        GenerationRequest::new(target_min, target_max, max_attempts)
    }

    /// The generate button's click handler.
    pub fn on_generate_clicked(
        &self,
        doc: &mut Document,
        api: &ApiClient<'_>,
        host: &mut dyn Host,
    ) -> GenerationOutcome {
        let request = match Self::read_request(doc) {
            Ok(request) => request,
            Err(error) => {
                tracing::debug!(%error, "generation rejected before dispatch");
                let message = match &error {
                    ValidationError::NotAnInteger { field, .. } => {
                        self.messages.not_an_integer(field)
                    }
                    _ => self.messages.inverted_range().to_string(),
                };
                doc.show_status(ids::STATUS, StatusKind::Error, message);
                host.repaint(doc);
                return GenerationOutcome::Rejected(error);
            }
        };

        self.enter_loading(doc);
        host.repaint(doc);

        tracing::info!(
            target_min = request.target_min(),
            target_max = request.target_max(),
            max_attempts = request.max_attempts(),
            "requesting position"
        );

        let outcome = match api.generate(&request) {
            Ok(result) if result.success => match result.data {
                Some(report) => {
                    self.render_report(doc, &report);
                    doc.set_hidden(ids::RESULTS, false);
                    doc.show_status(ids::STATUS, StatusKind::Success, self.messages.generated());
                    GenerationOutcome::Generated(report)
                }
                None => {
                    let detail = "missing `data` in a successful response";
                    tracing::warn!(detail, "malformed generation response");
                    doc.show_status(
                        ids::STATUS,
                        StatusKind::Error,
                        self.messages.connection_error(detail),
                    );
                    GenerationOutcome::TransportFailed(detail.to_string())
                }
            },
            Ok(result) => {
                let error = result
                    .error
                    .unwrap_or_else(|| self.messages.unknown_error().to_string());
                tracing::warn!(%error, "backend reported a generation failure");
                doc.show_status(
                    ids::STATUS,
                    StatusKind::Error,
                    self.messages.server_error(&error),
                );
                GenerationOutcome::ServerError(error)
            }
            Err(error) => {
                let detail = error.to_string();
                doc.show_status(
                    ids::STATUS,
                    StatusKind::Error,
                    self.messages.connection_error(&detail),
                );
                GenerationOutcome::TransportFailed(detail)
            }
        };

        self.leave_loading(doc);
        host.repaint(doc);
        outcome
    }

    /// Copy the displayed FEN, flash a confirmation on the copy button, then
    /// restore its label. Returns whether the clipboard accepted the text.
    pub fn copy_fen_to_clipboard(&self, doc: &mut Document, host: &mut dyn Host) -> bool {
        let fen = doc.text(ids::FEN).unwrap_or_default().to_string();
        match host.write_clipboard(&fen) {
            Ok(()) => {
                let original = doc.text(ids::COPY_FEN_BTN).unwrap_or_default().to_string();
                doc.set_text(ids::COPY_FEN_BTN, self.messages.copied());
                host.repaint(doc);
                host.pause(COPY_CONFIRMATION);
                doc.set_text(ids::COPY_FEN_BTN, original);
                host.repaint(doc);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "clipboard write failed");
                host.alert(&self.messages.copy_failed(&format!("{e:#}")));
                false
            }
        }
    }

    fn enter_loading(&self, doc: &mut Document) {
        doc.set_disabled(ids::GENERATE_BTN, true);
        doc.set_hidden(ids::BTN_TEXT, true);
        doc.set_hidden(ids::LOADER, false);
        doc.set_hidden(ids::RESULTS, true);
        doc.show_status(ids::STATUS, StatusKind::Info, self.messages.generating());
    }

    fn leave_loading(&self, doc: &mut Document) {
        doc.set_disabled(ids::GENERATE_BTN, false);
        doc.set_hidden(ids::BTN_TEXT, false);
        doc.set_hidden(ids::LOADER, true);
    }

    fn render_report(&self, doc: &mut Document, report: &PositionReport) {
        doc.set_text(ids::FEN, report.fen.as_str());
        doc.set_text(ids::WHITE_MATERIAL, format_number(report.white_material));
        doc.set_text(ids::BLACK_MATERIAL, format_number(report.black_material));
        doc.set_text(ids::MATERIAL_DIFF, format_number(report.material_difference));
        doc.set_text(ids::TURN, report.turn.as_str());
        doc.set_text(ids::EVAL_LINE1, report.eval_line1.as_str());
        doc.set_text(ids::EVAL_LINE2, report.eval_line2.as_str());
        doc.set_text(
            ids::ATTEMPTS,
            format_thousands(report.attempts, self.messages.locale()),
        );
        doc.set_text(ids::TIME, format_seconds(report.time_seconds));

        let links = AnalysisLinks::for_fen(&report.fen);
        doc.set_href(ids::LICHESS_LINK, links.lichess);
        doc.set_href(ids::CHESSCOM_LINK, links.chess_com);
    }
}

fn parse_field(doc: &Document, id: &str, field: &'static str) -> Result<i64, ValidationError> {
    let raw = doc.value(id).unwrap_or_default();
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger {
            field,
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
