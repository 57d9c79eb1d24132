//! The try-on flow: person photo, garment choice, optional zone markup,
//! generation with live progress, result handling.

use egui::Vec2;
use futures_channel::mpsc::UnboundedSender;

use crate::api::generation::GenerateRequest;
use crate::api::ApiClient;
use crate::cropper;
use crate::editor::{BodyEditorAction, BodyZoneEditor, GarmentEditorAction, GarmentZoneEditor};
use crate::generation::{self, JobEvent, JobHandle, JobOutcome};
use crate::images::ImageStore;
use crate::inbox::Inbox;
use crate::models::{BalanceInfo, ClothingItem, Lookbook, PendingGeneration, ReplicateCategory};
use crate::platform;
use crate::ui::toasts::Toasts;
use crate::upload::validate_upload;
use crate::zones::{BodyZone, ZoneRect};

/// What the screen asks the app shell to do.
pub enum TryOnAction {
    BrowseCatalog,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Running { progress: f32 },
    Done { image_url: String },
}

#[derive(Debug, Clone)]
pub struct GarmentChoice {
    pub image: String,
    pub label: String,
    pub category_hint: Option<ReplicateCategory>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UploadSlot {
    Person,
    Garment,
}

struct UploadMsg {
    slot: UploadSlot,
    name: String,
    bytes: Vec<u8>,
}

struct SaveDialog {
    books: Option<Vec<Lookbook>>,
    selected: usize,
    list_inbox: Inbox<Result<Vec<Lookbook>, String>>,
    update_inbox: Inbox<Result<Lookbook, String>>,
    saving: bool,
}

pub struct TryOnScreen {
    person: Option<String>,
    garment: Option<GarmentChoice>,
    description: String,
    body_zones: Vec<BodyZone>,
    garment_zone: Option<ZoneRect>,
    body_editor: Option<BodyZoneEditor>,
    garment_editor: Option<GarmentZoneEditor>,
    phase: Phase,
    job: Option<JobHandle>,
    job_events: Inbox<JobEvent>,
    uploads: Inbox<UploadMsg>,
    save_dialog: Option<SaveDialog>,
}

impl Default for TryOnScreen {
    fn default() -> Self {
        Self {
            person: None,
            garment: None,
            description: String::new(),
            body_zones: Vec::new(),
            garment_zone: None,
            body_editor: None,
            garment_editor: None,
            phase: Phase::Idle,
            job: None,
            job_events: Inbox::new(),
            uploads: Inbox::new(),
            save_dialog: None,
        }
    }
}

impl TryOnScreen {
    /// Adopt a garment picked in the catalog screen.
    pub fn set_garment_from_catalog(&mut self, item: &ClothingItem) {
        self.garment = Some(GarmentChoice {
            image: item.image_url.clone(),
            label: item.name.clone(),
            category_hint: item.replicate_category,
        });
        self.garment_zone = None;
    }

    /// Re-enter polling for a job that survived a reload.
    pub fn resume(&mut self, api: &ApiClient, pending: PendingGeneration, ctx: &egui::Context) {
        self.person = Some(pending.person_image.clone());
        self.garment = Some(GarmentChoice {
            image: pending.garment_image.clone(),
            label: "resumed garment".to_string(),
            category_hint: pending.category_hint,
        });
        self.description = pending.description.clone();
        self.phase = Phase::Running { progress: 0.0 };
        self.job = Some(generation::resume_job(
            api.clone(),
            pending,
            self.job_events.sender(),
            ctx.clone(),
        ));
    }

    /// Fold one job event into the screen state. Returns `true` when the job
    /// reached a terminal state (the shell refreshes the wallet then).
    pub fn apply_job_event(&mut self, event: JobEvent, toasts: &mut Toasts) -> bool {
        match event {
            JobEvent::Progress(p) => {
                if let Phase::Running { progress } = &mut self.phase {
                    *progress = p;
                }
                false
            }
            JobEvent::Finished(outcome) => {
                self.job = None;
                match outcome {
                    JobOutcome::Completed { image_url } => {
                        self.phase = Phase::Done { image_url };
                        toasts.success("Your try-on is ready");
                    }
                    JobOutcome::Failed(message) => {
                        self.phase = Phase::Idle;
                        toasts.error(format!("Generation failed: {message}"));
                    }
                    JobOutcome::TimedOut => {
                        self.phase = Phase::Idle;
                        toasts.error("Generation timed out, please try again");
                    }
                    JobOutcome::Cancelled => {
                        self.phase = Phase::Idle;
                        toasts.info("Generation cancelled");
                    }
                }
                true
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        images: &mut ImageStore,
        toasts: &mut Toasts,
        balance: Option<&BalanceInfo>,
        balance_tx: &UnboundedSender<Result<BalanceInfo, String>>,
    ) -> Option<TryOnAction> {
        let ctx = ui.ctx().clone();
        let mut action = None;

        while let Some(msg) = self.uploads.next() {
            self.handle_upload(msg, &ctx, images, toasts);
        }
        let mut finished = false;
        while let Some(event) = self.job_events.next() {
            finished |= self.apply_job_event(event, toasts);
        }
        if finished {
            crate::ui::wallet::refresh_balance(api, balance_tx, &ctx);
        }

        ui.columns(2, |columns| {
            self.person_panel(&mut columns[0], images);
            if let Some(a) = self.garment_panel(&mut columns[1], images) {
                action = Some(a);
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Notes for the stylist:");
            ui.text_edit_singleline(&mut self.description);
        });

        ui.add_space(8.0);
        self.generate_controls(ui, api, images, toasts, balance, balance_tx);

        self.show_editors(&ctx, images);
        self.show_save_dialog(&ctx, api, toasts);

        action
    }

    fn person_panel(&mut self, ui: &mut egui::Ui, images: &mut ImageStore) {
        ui.group(|ui| {
            ui.heading("Your photo");
            match self.person.clone() {
                Some(url) => {
                    preview(ui, images, &url, Vec2::new(220.0, 300.0));
                    ui.horizontal(|ui| {
                        if ui.button("Replace").clicked() {
                            self.pick_file(ui.ctx(), UploadSlot::Person);
                        }
                        if ui.button("Mark body zones").clicked() && self.body_editor.is_none() {
                            self.body_editor =
                                Some(BodyZoneEditor::new(url.clone(), &self.body_zones));
                        }
                    });
                    if !self.body_zones.is_empty() {
                        ui.weak(format!("{} zone(s) marked", self.body_zones.len()));
                    }
                }
                None => {
                    ui.label("Upload a full-length photo (JPEG, PNG or WebP, up to 10 MB).");
                    if ui.button("Upload photo").clicked() {
                        self.pick_file(ui.ctx(), UploadSlot::Person);
                    }
                }
            }
        });
    }

    fn garment_panel(&mut self, ui: &mut egui::Ui, images: &mut ImageStore) -> Option<TryOnAction> {
        let mut action = None;
        ui.group(|ui| {
            ui.heading("Garment");
            match self.garment.clone() {
                Some(choice) => {
                    preview(ui, images, &choice.image, Vec2::new(220.0, 300.0));
                    ui.label(&choice.label);
                    ui.horizontal(|ui| {
                        if ui.button("Pick another").clicked() {
                            action = Some(TryOnAction::BrowseCatalog);
                        }
                        if ui.button("Mark placement").clicked() && self.garment_editor.is_none() {
                            self.garment_editor = Some(GarmentZoneEditor::new(
                                choice.image.clone(),
                                self.garment_zone,
                            ));
                        }
                    });
                    self.category_hint_picker(ui);
                }
                None => {
                    if ui.button("Choose from catalog").clicked() {
                        action = Some(TryOnAction::BrowseCatalog);
                    }
                    if ui.button("Upload your own").clicked() {
                        self.pick_file(ui.ctx(), UploadSlot::Garment);
                    }
                }
            }
        });
        action
    }

    fn category_hint_picker(&mut self, ui: &mut egui::Ui) {
        let Some(choice) = &mut self.garment else { return };
        egui::ComboBox::from_label("Garment type")
            .selected_text(
                choice
                    .category_hint
                    .map(|c| c.label())
                    .unwrap_or("auto-detect"),
            )
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut choice.category_hint, None, "auto-detect");
                for category in ReplicateCategory::ALL {
                    ui.selectable_value(
                        &mut choice.category_hint,
                        Some(category),
                        category.label(),
                    );
                }
            });
    }

    fn generate_controls(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        images: &mut ImageStore,
        toasts: &mut Toasts,
        balance: Option<&BalanceInfo>,
        balance_tx: &UnboundedSender<Result<BalanceInfo, String>>,
    ) {
        match self.phase.clone() {
            Phase::Idle => {
                let can_generate = balance.map(|b| b.can_generate).unwrap_or(false);
                let ready = self.person.is_some() && self.garment.is_some();
                let button = ui.add_enabled(
                    ready && can_generate,
                    egui::Button::new("Generate try-on"),
                );
                if !can_generate {
                    ui.weak("No tries left — top up in the wallet tab.");
                } else if !ready {
                    ui.weak("Add your photo and a garment first.");
                }
                if button.clicked() {
                    self.start_generation(ui.ctx(), api, toasts, balance_tx);
                }
            }
            Phase::Running { progress } => {
                ui.add(egui::ProgressBar::new(progress / 100.0).show_percentage());
                if ui.button("Cancel").clicked() {
                    if let Some(job) = &self.job {
                        job.cancel();
                    }
                }
            }
            Phase::Done { image_url } => {
                ui.heading("Result");
                preview(ui, images, &image_url, Vec2::new(360.0, 440.0));
                ui.horizontal(|ui| {
                    if ui.button("Save to lookbook").clicked() {
                        self.open_save_dialog(ui.ctx(), api);
                    }
                    if ui.button("Start over").clicked() {
                        self.phase = Phase::Idle;
                    }
                });
            }
        }
    }

    fn start_generation(
        &mut self,
        ctx: &egui::Context,
        api: &ApiClient,
        toasts: &mut Toasts,
        balance_tx: &UnboundedSender<Result<BalanceInfo, String>>,
    ) {
        let (Some(person), Some(garment)) = (self.person.clone(), self.garment.clone()) else {
            return;
        };
        let request = GenerateRequest {
            person_image: person,
            garment_image: garment.image,
            description: self.description.clone(),
            category_hint: garment.category_hint,
        };
        self.phase = Phase::Running { progress: 0.0 };
        self.job = Some(generation::start_job(
            api.clone(),
            request,
            self.job_events.sender(),
            ctx.clone(),
        ));
        toasts.info("Generation started");

        // Debit one try; the wallet chip updates from the response.
        let api = api.clone();
        let tx = balance_tx.clone();
        let ctx = ctx.clone();
        platform::execute(async move {
            let result = api.deduct_try().await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }

    fn pick_file(&mut self, ctx: &egui::Context, slot: UploadSlot) {
        let tx = self.uploads.sender();
        let ctx = ctx.clone();
        platform::pick_image_file(move |file| {
            let _ = tx.unbounded_send(UploadMsg {
                slot,
                name: file.name,
                bytes: file.bytes,
            });
            ctx.request_repaint();
        });
    }

    fn handle_upload(
        &mut self,
        msg: UploadMsg,
        ctx: &egui::Context,
        images: &mut ImageStore,
        toasts: &mut Toasts,
    ) {
        if let Err(e) = validate_upload(&msg.name, &msg.bytes) {
            toasts.error(e.to_string());
            return;
        }
        let aspect = match msg.slot {
            UploadSlot::Person => cropper::PERSON_ASPECT,
            UploadSlot::Garment => cropper::GARMENT_ASPECT,
        };
        let jpeg = match cropper::cover_crop_to_jpeg(&msg.bytes, aspect, cropper::OUTPUT_WIDTH) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                toasts.error(e.to_string());
                return;
            }
        };
        let data_url = cropper::to_jpeg_data_url(&jpeg);
        images.insert_bytes(ctx, &data_url, jpeg);

        match msg.slot {
            UploadSlot::Person => {
                self.person = Some(data_url);
                self.body_zones.clear();
            }
            UploadSlot::Garment => {
                self.garment = Some(GarmentChoice {
                    image: data_url,
                    label: msg.name,
                    category_hint: None,
                });
                self.garment_zone = None;
            }
        }
    }

    fn show_editors(&mut self, ctx: &egui::Context, images: &mut ImageStore) {
        if let Some(editor) = &mut self.body_editor {
            match editor.show(ctx, images) {
                Some(BodyEditorAction::Save(zones)) => {
                    self.body_zones = zones;
                    self.body_editor = None;
                }
                Some(BodyEditorAction::Cancel) => self.body_editor = None,
                None => {}
            }
        }
        if let Some(editor) = &mut self.garment_editor {
            match editor.show(ctx, images) {
                Some(GarmentEditorAction::Save(zone)) => {
                    self.garment_zone = zone;
                    self.garment_editor = None;
                }
                Some(GarmentEditorAction::Cancel) => self.garment_editor = None,
                None => {}
            }
        }
    }

    fn open_save_dialog(&mut self, ctx: &egui::Context, api: &ApiClient) {
        let dialog = SaveDialog {
            books: None,
            selected: 0,
            list_inbox: Inbox::new(),
            update_inbox: Inbox::new(),
            saving: false,
        };
        let tx = dialog.list_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        platform::execute(async move {
            let result = api.fetch_lookbooks().await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
        self.save_dialog = Some(dialog);
    }

    fn show_save_dialog(&mut self, ctx: &egui::Context, api: &ApiClient, toasts: &mut Toasts) {
        let Some(dialog) = &mut self.save_dialog else { return };
        let Phase::Done { image_url } = self.phase.clone() else {
            self.save_dialog = None;
            return;
        };

        while let Some(result) = dialog.list_inbox.next() {
            match result {
                Ok(books) => dialog.books = Some(books),
                Err(e) => {
                    toasts.error(format!("Could not load lookbooks: {e}"));
                    self.save_dialog = None;
                    return;
                }
            }
        }
        while let Some(result) = dialog.update_inbox.next() {
            match result {
                Ok(book) => {
                    toasts.success(format!("Saved to \"{}\"", book.name));
                    self.save_dialog = None;
                    return;
                }
                Err(e) => {
                    toasts.error(format!("Could not save photo: {e}"));
                    dialog.saving = false;
                }
            }
        }

        let mut close = false;
        egui::Window::new("Save to lookbook")
            .collapsible(false)
            .show(ctx, |ui| {
                match &dialog.books {
                    None => {
                        ui.spinner();
                    }
                    Some(books) if books.is_empty() => {
                        ui.label("No lookbooks yet — create one in the Lookbooks tab.");
                    }
                    Some(books) => {
                        egui::ComboBox::from_label("Lookbook")
                            .selected_text(
                                books
                                    .get(dialog.selected)
                                    .map(|b| b.name.as_str())
                                    .unwrap_or(""),
                            )
                            .show_ui(ui, |ui| {
                                for (i, book) in books.iter().enumerate() {
                                    ui.selectable_value(&mut dialog.selected, i, &book.name);
                                }
                            });
                        if ui
                            .add_enabled(!dialog.saving, egui::Button::new("Save"))
                            .clicked()
                        {
                            if let Some(book) = books.get(dialog.selected) {
                                dialog.saving = true;
                                let mut updated = book.clone();
                                updated.photos.push(image_url.clone());
                                let tx = dialog.update_inbox.sender();
                                let api = api.clone();
                                let ctx = ctx.clone();
                                platform::execute(async move {
                                    let result = api
                                        .update_lookbook(&updated)
                                        .await
                                        .map_err(|e| e.to_string());
                                    let _ = tx.unbounded_send(result);
                                    ctx.request_repaint();
                                });
                            }
                        }
                    }
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        if close {
            self.save_dialog = None;
        }
    }
}

/// Thumbnail-style preview with a spinner while the image loads.
fn preview(ui: &mut egui::Ui, images: &mut ImageStore, url: &str, max: Vec2) {
    let ctx = ui.ctx().clone();
    match images.get(&ctx, url).cloned() {
        Some(texture) => {
            let [w, h] = texture.size();
            let size = Vec2::new(w as f32, h as f32);
            let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
            ui.add(egui::Image::new(&texture).fit_to_exact_size(size * scale));
        }
        None => {
            ui.spinner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[test]
    fn completion_moves_to_done_and_reports_terminal() {
        let mut screen = TryOnScreen::default();
        let mut toasts = Toasts::default();
        screen.phase = Phase::Running { progress: 40.0 };

        assert!(!screen.apply_job_event(JobEvent::Progress(55.0), &mut toasts));
        assert_eq!(screen.phase, Phase::Running { progress: 55.0 });

        let finished = screen.apply_job_event(
            JobEvent::Finished(JobOutcome::Completed {
                image_url: "https://cdn.example/r.jpg".into(),
            }),
            &mut toasts,
        );
        assert!(finished);
        assert_eq!(
            screen.phase,
            Phase::Done {
                image_url: "https://cdn.example/r.jpg".into()
            }
        );
    }

    #[test]
    fn cancellation_resets_to_idle() {
        let mut screen = TryOnScreen::default();
        let mut toasts = Toasts::default();
        screen.phase = Phase::Running { progress: 10.0 };

        // the driver clears the checkpoint before sending the event
        storage::clear_pending_generation();
        screen.apply_job_event(JobEvent::Finished(JobOutcome::Cancelled), &mut toasts);

        assert_eq!(screen.phase, Phase::Idle);
        assert!(screen.job.is_none());
        assert!(storage::load_pending_generation().is_none());
    }

    #[test]
    fn failure_and_timeout_reset_to_idle() {
        let mut screen = TryOnScreen::default();
        let mut toasts = Toasts::default();

        screen.phase = Phase::Running { progress: 10.0 };
        screen.apply_job_event(
            JobEvent::Finished(JobOutcome::Failed("bad input".into())),
            &mut toasts,
        );
        assert_eq!(screen.phase, Phase::Idle);

        screen.phase = Phase::Running { progress: 10.0 };
        screen.apply_job_event(JobEvent::Finished(JobOutcome::TimedOut), &mut toasts);
        assert_eq!(screen.phase, Phase::Idle);
    }

    #[test]
    fn progress_events_are_ignored_outside_running() {
        let mut screen = TryOnScreen::default();
        let mut toasts = Toasts::default();
        screen.apply_job_event(JobEvent::Progress(50.0), &mut toasts);
        assert_eq!(screen.phase, Phase::Idle);
    }
}
