//! Lookbooks: create, browse, curate photos, edit the palette, export PDF.
//!
//! Photo moves between books are client-composed (two full-replacement PUTs)
//! because the endpoint only understands whole-book updates.

use egui::{Color32, Vec2};

use crate::api::ApiClient;
use crate::images::ImageStore;
use crate::inbox::Inbox;
use crate::models::Lookbook;
use crate::pdf;
use crate::platform;
use crate::ui::toasts::Toasts;

pub struct LookbooksScreen {
    books: Option<Vec<Lookbook>>,
    list_inbox: Inbox<Result<Vec<Lookbook>, String>>,
    write_inbox: Inbox<Result<String, String>>,
    new_name: String,
    new_person: String,
    new_palette_entry: String,
    selected: usize,
    /// Index of the book being exported; waits for photo bytes to arrive.
    exporting: Option<usize>,
    started: bool,
}

impl Default for LookbooksScreen {
    fn default() -> Self {
        Self {
            books: None,
            list_inbox: Inbox::new(),
            write_inbox: Inbox::new(),
            new_name: String::new(),
            new_person: String::new(),
            new_palette_entry: String::new(),
            selected: 0,
            exporting: None,
            started: false,
        }
    }
}

impl LookbooksScreen {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        images: &mut ImageStore,
        toasts: &mut Toasts,
    ) {
        let ctx = ui.ctx().clone();
        if !self.started {
            self.started = true;
            self.fetch_books(api, &ctx);
        }
        self.pump(api, &ctx, toasts);
        self.drive_export(&ctx, images, toasts);

        ui.heading("Lookbooks");
        self.create_form(ui, api, &ctx, toasts);
        ui.separator();

        let Some(books) = self.books.clone() else {
            ui.spinner();
            return;
        };
        if books.is_empty() {
            ui.label("No lookbooks yet.");
            return;
        }

        self.selected = self.selected.min(books.len() - 1);
        ui.horizontal_wrapped(|ui| {
            for (i, book) in books.iter().enumerate() {
                ui.selectable_value(&mut self.selected, i, &book.name);
            }
        });
        ui.separator();

        let book = &books[self.selected];
        self.book_detail(ui, api, &ctx, images, toasts, book, &books);
    }

    fn create_form(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        ctx: &egui::Context,
        toasts: &mut Toasts,
    ) {
        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.new_name);
            ui.label("Person:");
            ui.text_edit_singleline(&mut self.new_person);
            if ui.button("Create").clicked() {
                if self.new_name.trim().is_empty() {
                    toasts.error("Give the lookbook a name");
                } else {
                    let book = Lookbook {
                        id: uuid::Uuid::new_v4().to_string(),
                        name: self.new_name.trim().to_string(),
                        person_name: self.new_person.trim().to_string(),
                        ..Default::default()
                    };
                    self.new_name.clear();
                    self.new_person.clear();
                    let tx = self.write_inbox.sender();
                    let api = api.clone();
                    let ctx = ctx.clone();
                    platform::execute(async move {
                        let result = api
                            .create_lookbook(&book)
                            .await
                            .map(|b| format!("Created \"{}\"", b.name))
                            .map_err(|e| e.to_string());
                        let _ = tx.unbounded_send(result);
                        ctx.request_repaint();
                    });
                }
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn book_detail(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        ctx: &egui::Context,
        images: &mut ImageStore,
        toasts: &mut Toasts,
        book: &Lookbook,
        all_books: &[Lookbook],
    ) {
        if !book.person_name.is_empty() {
            ui.weak(format!("for {}", book.person_name));
        }

        self.palette_row(ui, api, ctx, book);

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.exporting.is_none(), egui::Button::new("Export PDF"))
                .clicked()
            {
                self.exporting = Some(self.selected);
                toasts.info("Preparing PDF…");
            }
            if self.exporting.is_some() {
                ui.spinner();
            }
        });

        ui.add_space(6.0);
        if book.photos.is_empty() {
            ui.weak("No photos yet — save a try-on result here.");
            return;
        }

        let targets: Vec<(usize, String)> = all_books
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.selected)
            .map(|(i, b)| (i, b.name.clone()))
            .collect();

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (photo_index, url) in book.photos.iter().enumerate() {
                    ui.group(|ui| {
                        ui.set_width(140.0);
                        ui.vertical(|ui| {
                            match images.get(ctx, url).cloned() {
                                Some(texture) => {
                                    let [w, h] = texture.size();
                                    let size = Vec2::new(w as f32, h as f32);
                                    let scale = (130.0 / size.x).min(170.0 / size.y);
                                    ui.add(
                                        egui::Image::new(&texture)
                                            .fit_to_exact_size(size * scale),
                                    );
                                }
                                None => {
                                    ui.add_sized(Vec2::new(130.0, 170.0), egui::Spinner::new());
                                }
                            }
                            ui.horizontal(|ui| {
                                if ui.small_button("Remove").clicked() {
                                    let mut updated = book.clone();
                                    updated.photos.remove(photo_index);
                                    self.put_book(api, ctx, updated, "Photo removed");
                                }
                                if !targets.is_empty() {
                                    ui.menu_button("Move to…", |ui| {
                                        for (target_index, name) in &targets {
                                            if ui.button(name).clicked() {
                                                self.transfer_photo(
                                                    api,
                                                    ctx,
                                                    all_books,
                                                    photo_index,
                                                    *target_index,
                                                );
                                                ui.close_menu();
                                            }
                                        }
                                    });
                                }
                            });
                        });
                    });
                }
            });
        });
    }

    fn palette_row(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        ctx: &egui::Context,
        book: &Lookbook,
    ) {
        ui.horizontal(|ui| {
            ui.label("Palette:");
            for (i, hex) in book.palette.iter().enumerate() {
                let color = pdf::parse_hex_color(hex)
                    .map(|(r, g, b)| Color32::from_rgb(r, g, b))
                    .unwrap_or(Color32::DARK_GRAY);
                let (rect, response) =
                    ui.allocate_exact_size(Vec2::splat(18.0), egui::Sense::click());
                ui.painter().rect_filled(rect, 3.0, color);
                if response.on_hover_text(format!("{hex} — click to remove")).clicked() {
                    let mut updated = book.clone();
                    updated.palette.remove(i);
                    self.put_book(api, ctx, updated, "Palette updated");
                }
            }
            ui.add(
                egui::TextEdit::singleline(&mut self.new_palette_entry)
                    .hint_text("#aabbcc")
                    .desired_width(70.0),
            );
            if ui.small_button("+").clicked() {
                if pdf::parse_hex_color(&self.new_palette_entry).is_some() {
                    let mut updated = book.clone();
                    updated.palette.push(self.new_palette_entry.trim().to_string());
                    self.new_palette_entry.clear();
                    self.put_book(api, ctx, updated, "Palette updated");
                } else {
                    log::warn!("not a hex color: {}", self.new_palette_entry);
                }
            }
        });
    }

    /// PUT one book and report through the write inbox.
    fn put_book(&self, api: &ApiClient, ctx: &egui::Context, book: Lookbook, success: &str) {
        let tx = self.write_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        let success = success.to_string();
        platform::execute(async move {
            let result = api
                .update_lookbook(&book)
                .await
                .map(|_| success)
                .map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }

    /// Move a photo between books: two sequential full-replacement PUTs.
    /// If the second PUT fails the photo exists in both books; the server is
    /// the source of truth and the refetch shows whatever it kept.
    fn transfer_photo(
        &self,
        api: &ApiClient,
        ctx: &egui::Context,
        all_books: &[Lookbook],
        photo_index: usize,
        target_index: usize,
    ) {
        let mut source = all_books[self.selected].clone();
        let mut target = all_books[target_index].clone();
        if photo_index >= source.photos.len() {
            return;
        }
        let photo = source.photos.remove(photo_index);
        target.photos.push(photo);

        let tx = self.write_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        let target_name = target.name.clone();
        platform::execute(async move {
            let result = async {
                api.update_lookbook(&target).await?;
                api.update_lookbook(&source).await
            }
            .await
            .map(|_| format!("Moved to \"{target_name}\""))
            .map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }

    /// Wait until every photo of the exported book has bytes, then build the
    /// PDF and hand it to the browser. Runs a little further every frame.
    fn drive_export(&mut self, ctx: &egui::Context, images: &mut ImageStore, toasts: &mut Toasts) {
        let Some(index) = self.exporting else { return };
        let Some(book) = self.books.as_ref().and_then(|b| b.get(index)).cloned() else {
            self.exporting = None;
            return;
        };

        // kick off every fetch before checking, so they load in parallel
        for url in &book.photos {
            let _ = images.get(ctx, url);
        }
        let mut photos = Vec::with_capacity(book.photos.len());
        for url in &book.photos {
            match images.raw_bytes(url) {
                Some(bytes) => photos.push(bytes.to_vec()),
                None => return, // still loading; try again next frame
            }
        }

        self.exporting = None;
        match pdf::lookbook_pdf(&book, &photos) {
            Ok(bytes) => {
                let file = format!("{}.pdf", book.name.replace(' ', "_"));
                platform::download_bytes(&file, "application/pdf", &bytes);
                toasts.success("Lookbook exported");
            }
            Err(e) => toasts.error(format!("PDF export failed: {e}")),
        }
    }

    fn pump(&mut self, api: &ApiClient, ctx: &egui::Context, toasts: &mut Toasts) {
        while let Some(result) = self.list_inbox.next() {
            match result {
                Ok(books) => self.books = Some(books),
                Err(e) => toasts.error(format!("Could not load lookbooks: {e}")),
            }
        }
        let mut needs_refresh = false;
        while let Some(result) = self.write_inbox.next() {
            match result {
                Ok(message) => {
                    toasts.success(message);
                    needs_refresh = true;
                }
                Err(e) => {
                    toasts.error(format!("Lookbook update failed: {e}"));
                    needs_refresh = true;
                }
            }
        }
        if needs_refresh {
            self.fetch_books(api, ctx);
        }
    }

    fn fetch_books(&mut self, api: &ApiClient, ctx: &egui::Context) {
        let tx = self.list_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        platform::execute(async move {
            let result = api.fetch_lookbooks().await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }
}
