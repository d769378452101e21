//*** START FILE: src/gui.rs ***//
use eframe::{egui, App};
use std::fs;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::warn;

use translation_ranker::access::Mode;
use translation_ranker::events::{drain, AnnotatorEvent};
use translation_ranker::export::ExportKind;
use translation_ranker::session::ControllerState;
use translation_ranker::store::FileStore;
use translation_ranker::{Annotator, Error, Result};

/// What was clicked on the board or in the editor this frame. Applied after
/// drawing so the annotator is not borrowed twice.
enum BoardAction {
    Up(usize),
    Down(usize),
    KeepOrder,
    Previous,
    Next,
    Submit,
    StartEdit(usize),
    StartAdd,
    SaveDraft,
    CancelDraft,
    Delete(usize),
    AskClear,
    ClearAll,
}

/// Candidate text being typed in the owner editor; `index` is None for a
/// new candidate.
struct Draft {
    index: Option<usize>,
    text: String,
    focus: bool,
}

pub struct RankingApp {
    annotator: Annotator<FileStore>,
    events: broadcast::Receiver<AnnotatorEvent>,
    export_dir: PathBuf,
    status: String,
    error: Option<String>,
    password_input: String,
    csv_path_input: String,
    draft: Option<Draft>,
    confirm_clear: bool,
}

impl RankingApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, mut annotator: Annotator<FileStore>, export_dir: PathBuf) -> Self {
        let events = annotator.subscribe();
        let status = if annotator.has_corpus() {
            String::new()
        } else {
            "No corpus loaded yet.".to_string()
        };
        let mut app = Self {
            annotator,
            events,
            export_dir,
            status,
            error: None,
            password_input: String::new(),
            csv_path_input: String::new(),
            draft: None,
            confirm_clear: false,
        };
        if app.annotator.has_corpus() {
            app.annotator.start_session();
        }
        app
    }

    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(e) => {
                warn!("{}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn drain_events(&mut self) {
        for event in drain(&mut self.events) {
            self.status = match event {
                AnnotatorEvent::CorpusLoaded { sentences } => format!("Loaded {} sentences.", sentences),
                AnnotatorEvent::SessionStarted { size } => format!("New session with {} sentences.", size),
                AnnotatorEvent::SessionSubmitted { sentences, .. } => {
                    format!("Saved rankings for {} sentences.", sentences)
                }
                AnnotatorEvent::AllComplete { completed } => {
                    format!("All {} sentences have been annotated.", completed)
                }
                AnnotatorEvent::ProgressReset => "Progress reset.".to_string(),
                AnnotatorEvent::DataReset => "All data removed.".to_string(),
                AnnotatorEvent::ModeChanged { mode: Mode::Owner } => "Owner mode.".to_string(),
                AnnotatorEvent::ModeChanged { mode: Mode::User } => "User mode.".to_string(),
                AnnotatorEvent::SentenceChanged { .. }
                | AnnotatorEvent::RankingChanged { .. }
                | AnnotatorEvent::InteractionRecorded { .. } => continue,
            };
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let result = self.annotator.export_to(kind, &self.export_dir);
        if let Some(path) = self.report(result) {
            self.status = format!("Wrote {}", path.display());
        }
    }

    /// Ctrl/Cmd+N adds and Ctrl/Cmd+S exports the snapshot, both owner only.
    /// Escape drops an open draft or clear prompt.
    fn shortcuts(&mut self, ctx: &egui::Context) -> Option<BoardAction> {
        if (self.draft.is_some() || self.confirm_clear) && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            return Some(BoardAction::CancelDraft);
        }
        if self.annotator.mode() != Mode::Owner {
            return None;
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S)) {
            self.export(ExportKind::Snapshot);
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::N)) {
            return Some(BoardAction::StartAdd);
        }
        None
    }

    fn apply(&mut self, action: BoardAction) {
        match action {
            BoardAction::Up(i) => {
                let r = self.annotator.move_candidate(i, i.saturating_sub(1));
                self.report(r);
            }
            BoardAction::Down(i) => {
                let r = self.annotator.move_candidate(i, i + 1);
                self.report(r);
            }
            BoardAction::KeepOrder => {
                let r = self.annotator.confirm_order();
                self.report(r);
            }
            BoardAction::Previous => {
                self.draft = None;
                let r = self.annotator.retreat();
                self.report(r);
            }
            BoardAction::Next => {
                self.draft = None;
                let r = self.annotator.advance();
                self.report(r);
            }
            BoardAction::Submit => {
                let r = self.annotator.submit();
                self.report(r);
            }
            BoardAction::StartEdit(i) => {
                let text = self
                    .annotator
                    .active_session()
                    .and_then(|a| a.board().candidates().get(i))
                    .map(|c| c.text.clone());
                self.draft = text.map(|text| Draft {
                    index: Some(i),
                    text,
                    focus: true,
                });
            }
            BoardAction::StartAdd => {
                if self.annotator.active_session().is_some() {
                    self.draft = Some(Draft {
                        index: None,
                        text: String::new(),
                        focus: true,
                    });
                }
            }
            BoardAction::SaveDraft => {
                if let Some(draft) = self.draft.take() {
                    let r = match draft.index {
                        Some(i) => self.annotator.edit_candidate(i, &draft.text),
                        None => self.annotator.add_candidate(&draft.text),
                    };
                    self.report(r);
                }
            }
            BoardAction::CancelDraft => {
                self.draft = None;
                self.confirm_clear = false;
            }
            BoardAction::Delete(i) => {
                self.draft = None;
                let r = self.annotator.delete_candidate(i);
                self.report(r);
            }
            BoardAction::AskClear => {
                self.draft = None;
                self.confirm_clear = true;
            }
            BoardAction::ClearAll => {
                self.confirm_clear = false;
                let r = self.annotator.clear_candidates();
                self.report(r);
            }
        }
    }

    /// Shown when there is no session to work on. Returns true if it drew.
    fn idle_ui(&mut self, ui: &mut egui::Ui) -> bool {
        if self.annotator.active_session().is_some() {
            return false;
        }
        match self.annotator.state() {
            ControllerState::AllComplete => {
                ui.heading("All sentences have been annotated. Thank you!");
            }
            _ if !self.annotator.has_corpus() => {
                ui.label("No corpus loaded. The owner can import one from owner mode.");
            }
            _ => {
                if ui.button("Start session").clicked() {
                    self.annotator.start_session();
                }
            }
        }
        true
    }

    fn navigation_ui(&self, ui: &mut egui::Ui, action: &mut Option<BoardAction>) {
        let Some(active) = self.annotator.active_session() else {
            return;
        };
        ui.horizontal(|ui| {
            if ui.add_enabled(active.position() > 0, egui::Button::new("◀ Previous")).clicked() {
                *action = Some(BoardAction::Previous);
            }
            if ui.add_enabled(!active.is_last(), egui::Button::new("Next ▶")).clicked() {
                *action = Some(BoardAction::Next);
            }
        });
    }

    /// User mode: reorder, accept, navigate, submit.
    fn ranking_ui(&mut self, ui: &mut egui::Ui) -> Option<BoardAction> {
        if self.idle_ui(ui) {
            return None;
        }
        let mut action = None;
        let can_submit = self.annotator.can_submit();
        let active = self.annotator.active_session()?;

        let sentence = active.current();
        ui.horizontal(|ui| {
            ui.label(format!("Sentence {} of {}", active.position() + 1, active.len()));
            ui.separator();
            ui.label(format!("Ranked {}/{}", active.interacted_count(), active.len()));
            if active.has_interacted(&sentence.id) {
                ui.colored_label(egui::Color32::GREEN, "✔");
            }
        });
        ui.add(egui::ProgressBar::new(active.interacted_count() as f32 / active.len() as f32));
        ui.separator();
        ui.label("Source:");
        ui.heading(&sentence.source_text);
        ui.separator();
        ui.label("Rank the translations, best first:");

        let candidates = active.board().candidates();
        let last = candidates.len().saturating_sub(1);
        egui::ScrollArea::vertical().id_source("board_scroll").max_height(400.0).show(ui, |ui| {
            if candidates.is_empty() {
                ui.weak("No translations for this sentence.");
            }
            for (i, candidate) in candidates.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("{}.", i + 1));
                    if ui.add_enabled(i > 0, egui::Button::new("⬆")).clicked() {
                        action = Some(BoardAction::Up(i));
                    }
                    if ui.add_enabled(i < last, egui::Button::new("⬇")).clicked() {
                        action = Some(BoardAction::Down(i));
                    }
                    ui.label(&candidate.text);
                });
            }
        });

        if ui.button("Keep this order").clicked() {
            action = Some(BoardAction::KeepOrder);
        }
        ui.separator();

        ui.horizontal(|ui| {
            self.navigation_ui(ui, &mut action);
            if ui.add_enabled(can_submit, egui::Button::new("Submit session")).clicked() {
                action = Some(BoardAction::Submit);
            }
        });
        action
    }

    /// Owner mode: rewrite the candidate texts of the session's sentences.
    fn editor_ui(&mut self, ui: &mut egui::Ui) -> Option<BoardAction> {
        if self.idle_ui(ui) {
            return None;
        }
        let mut action = None;
        let active = self.annotator.active_session()?;
        let sentence = active.current();

        ui.label(format!("Editing sentence {} of {}", active.position() + 1, active.len()));
        ui.heading(&sentence.source_text);
        ui.separator();

        let candidates = active.board().candidates();
        egui::ScrollArea::vertical().id_source("editor_scroll").max_height(400.0).show(ui, |ui| {
            for (i, candidate) in candidates.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("{}.", i + 1));
                    match &mut self.draft {
                        Some(draft) if draft.index == Some(i) => {
                            draft_ui(ui, draft, &mut action);
                        }
                        _ => {
                            ui.label(&candidate.text);
                            if let Some(header) = &candidate.header {
                                ui.weak(format!("({})", header));
                            }
                            if ui.small_button("Edit").clicked() {
                                action = Some(BoardAction::StartEdit(i));
                            }
                            if ui.small_button("Delete").clicked() {
                                action = Some(BoardAction::Delete(i));
                            }
                        }
                    }
                });
            }
            if let Some(draft) = self.draft.as_mut().filter(|d| d.index.is_none()) {
                ui.horizontal(|ui| {
                    ui.label("New:");
                    draft_ui(ui, draft, &mut action);
                });
            }
        });
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Add translation").on_hover_text("Ctrl+N").clicked() {
                action = Some(BoardAction::StartAdd);
            }
            if self.confirm_clear {
                ui.label("Remove every translation of this sentence?");
                if ui.button("Yes").clicked() {
                    action = Some(BoardAction::ClearAll);
                }
                if ui.button("No").clicked() {
                    action = Some(BoardAction::CancelDraft);
                }
            } else if ui
                .add_enabled(!candidates.is_empty(), egui::Button::new("Clear all translations"))
                .clicked()
            {
                action = Some(BoardAction::AskClear);
            }
        });
        ui.separator();
        self.navigation_ui(ui, &mut action);
        action
    }

    fn owner_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Owner");
        ui.separator();

        let stats = self.annotator.stats();
        ui.collapsing("Progress", |ui| {
            ui.label(format!("Total sentences: {}", stats.total_sentences));
            ui.label(format!("Completed: {}", stats.completed));
            ui.label(format!("Remaining: {}", stats.remaining));
            ui.label(format!("Sessions: {}", stats.total_sessions));
            ui.label(format!("Annotations: {}", stats.total_annotations));
        });
        ui.separator();

        ui.label("Import corpus (CSV path):");
        ui.text_edit_singleline(&mut self.csv_path_input);
        if ui.button("Import").clicked() {
            let path = PathBuf::from(self.csv_path_input.trim());
            let result = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|text| self.annotator.import_corpus(&text));
            self.report(result);
        }
        ui.separator();

        ui.label(format!("Exports go to {}", self.export_dir.display()));
        for (label, kind) in [
            ("Export all annotations", ExportKind::Annotations),
            ("Export current snapshot (Ctrl+S)", ExportKind::Snapshot),
            ("Export original corpus", ExportKind::Corpus),
        ] {
            if ui.button(label).clicked() {
                self.export(kind);
            }
        }
        ui.separator();

        if ui.button("Reset progress").clicked() {
            let r = self.annotator.reset_progress();
            self.report(r);
        }
        if ui
            .button(egui::RichText::new("Delete all data").color(egui::Color32::RED))
            .clicked()
        {
            let r = self.annotator.reset_all();
            self.report(r);
        }
        ui.separator();

        if ui.button("Back to user mode").clicked() {
            let r = self.annotator.switch_mode(Mode::User);
            self.report(r);
        }
    }
}

fn draft_ui(ui: &mut egui::Ui, draft: &mut Draft, action: &mut Option<BoardAction>) {
    let response = ui.text_edit_singleline(&mut draft.text);
    if std::mem::take(&mut draft.focus) {
        response.request_focus();
    }
    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        *action = Some(BoardAction::SaveDraft);
    }
    if ui.button("Save").clicked() {
        *action = Some(BoardAction::SaveDraft);
    }
    if ui.button("Cancel").clicked() {
        *action = Some(BoardAction::CancelDraft);
    }
}

impl App for RankingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        if let Some(action) = self.shortcuts(ctx) {
            self.apply(action);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                if self.annotator.mode() == Mode::User {
                    ui.separator();
                    ui.label("Owner password:");
                    ui.add(egui::TextEdit::singleline(&mut self.password_input).password(true).desired_width(120.0));
                    if ui.button("Unlock").clicked() {
                        let attempt = std::mem::take(&mut self.password_input);
                        let r = self.annotator.authenticate(&attempt);
                        self.report(r);
                    }
                }
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err);
            } else {
                ui.label(&self.status);
            }
        });

        if self.annotator.mode() == Mode::Owner {
            egui::SidePanel::left("owner_panel").min_width(250.0).default_width(320.0).show(ctx, |ui| {
                self.owner_ui(ui);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let action = match self.annotator.mode() {
                Mode::User => self.ranking_ui(ui),
                Mode::Owner => self.editor_ui(ui),
            };
            if let Some(action) = action {
                self.apply(action);
            }
        });
    }
}
//*** END FILE: src/gui.rs ***//
