//! Admin panel: password login (bearer session persisted with its expiry),
//! dashboard stats, catalog item CRUD, user management, lookbook browser and
//! generation history.

use egui::Vec2;

use crate::api::ApiClient;
use crate::images::ImageStore;
use crate::inbox::Inbox;
use crate::models::{
    AdminSession, AdminStats, ClothingItem, GenerationRecord, Lookbook, ReplicateCategory,
    UserAccount,
};
use crate::platform;
use crate::storage;
use crate::ui::toasts::Toasts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminTab {
    Stats,
    Items,
    Users,
    Lookbooks,
    History,
}

/// Edit buffer for the item create/update form. Tag lists are edited as
/// comma-separated text and split on save.
#[derive(Default, Clone)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub categories: String,
    pub colors: String,
    pub archetypes: String,
    pub gender: String,
    pub replicate_category: Option<ReplicateCategory>,
}

impl ItemForm {
    pub fn from_item(item: &ClothingItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            categories: item.categories.join(", "),
            colors: item.colors.join(", "),
            archetypes: item.archetypes.join(", "),
            gender: item.gender.clone().unwrap_or_default(),
            replicate_category: item.replicate_category,
        }
    }

    pub fn to_item(&self, id: String) -> ClothingItem {
        ClothingItem {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            categories: split_csv(&self.categories),
            colors: split_csv(&self.colors),
            archetypes: split_csv(&self.archetypes),
            gender: match self.gender.trim() {
                "" => None,
                g => Some(g.to_string()),
            },
            replicate_category: self.replicate_category,
        }
    }
}

pub fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub struct AdminScreen {
    session: Option<AdminSession>,
    password: String,
    login_inbox: Inbox<Result<AdminSession, String>>,

    tab: AdminTab,
    tab_loaded: Option<AdminTab>,

    stats: Option<AdminStats>,
    stats_inbox: Inbox<Result<AdminStats, String>>,
    items: Vec<ClothingItem>,
    items_inbox: Inbox<Result<Vec<ClothingItem>, String>>,
    item_write_inbox: Inbox<Result<String, String>>,
    form: ItemForm,
    editing: Option<String>,
    users: Vec<UserAccount>,
    users_inbox: Inbox<Result<Vec<UserAccount>, String>>,
    user_write_inbox: Inbox<Result<UserAccount, String>>,
    books: Vec<Lookbook>,
    books_inbox: Inbox<Result<Vec<Lookbook>, String>>,
    history: Vec<GenerationRecord>,
    history_inbox: Inbox<Result<Vec<GenerationRecord>, String>>,
}

impl Default for AdminScreen {
    fn default() -> Self {
        Self {
            session: storage::load_admin_session(),
            password: String::new(),
            login_inbox: Inbox::new(),
            tab: AdminTab::Stats,
            tab_loaded: None,
            stats: None,
            stats_inbox: Inbox::new(),
            items: Vec::new(),
            items_inbox: Inbox::new(),
            item_write_inbox: Inbox::new(),
            form: ItemForm::default(),
            editing: None,
            users: Vec::new(),
            users_inbox: Inbox::new(),
            user_write_inbox: Inbox::new(),
            books: Vec::new(),
            books_inbox: Inbox::new(),
            history: Vec::new(),
            history_inbox: Inbox::new(),
        }
    }
}

impl AdminScreen {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        images: &mut ImageStore,
        toasts: &mut Toasts,
    ) {
        let ctx = ui.ctx().clone();
        self.pump(api, &ctx, toasts);

        let Some(session) = self.session.clone() else {
            self.login_form(ui, api, &ctx);
            return;
        };

        ui.horizontal(|ui| {
            ui.heading("Admin");
            if ui.button("Log out").clicked() {
                storage::clear_admin_session();
                self.session = None;
                self.tab_loaded = None;
            }
        });
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, AdminTab::Stats, "Stats");
            ui.selectable_value(&mut self.tab, AdminTab::Items, "Items");
            ui.selectable_value(&mut self.tab, AdminTab::Users, "Users");
            ui.selectable_value(&mut self.tab, AdminTab::Lookbooks, "Lookbooks");
            ui.selectable_value(&mut self.tab, AdminTab::History, "History");
        });
        ui.separator();

        if self.tab_loaded != Some(self.tab) {
            self.tab_loaded = Some(self.tab);
            self.fetch_tab(api, &ctx, &session);
        }

        match self.tab {
            AdminTab::Stats => self.stats_tab(ui),
            AdminTab::Items => self.items_tab(ui, api, &ctx, images, &session),
            AdminTab::Users => self.users_tab(ui, api, &ctx, &session),
            AdminTab::Lookbooks => self.lookbooks_tab(ui),
            AdminTab::History => self.history_tab(ui),
        }
    }

    fn login_form(&mut self, ui: &mut egui::Ui, api: &ApiClient, ctx: &egui::Context) {
        ui.heading("Admin login");
        let field = ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Log in").clicked() || submitted) && !self.password.is_empty() {
            let password = std::mem::take(&mut self.password);
            let tx = self.login_inbox.sender();
            let api = api.clone();
            let ctx = ctx.clone();
            platform::execute(async move {
                let result = api.admin_login(&password).await.map_err(|e| e.to_string());
                let _ = tx.unbounded_send(result);
                ctx.request_repaint();
            });
        }
    }

    fn stats_tab(&mut self, ui: &mut egui::Ui) {
        match &self.stats {
            None => {
                ui.spinner();
            }
            Some(stats) => {
                egui::Grid::new("admin_stats").show(ui, |ui| {
                    ui.label("Users");
                    ui.label(stats.total_users.to_string());
                    ui.end_row();
                    ui.label("Generations");
                    ui.label(stats.total_generations.to_string());
                    ui.end_row();
                    ui.label("Lookbooks");
                    ui.label(stats.total_lookbooks.to_string());
                    ui.end_row();
                    ui.label("Revenue");
                    ui.label(stats.revenue.to_string());
                    ui.end_row();
                });
            }
        }
    }

    fn items_tab(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        ctx: &egui::Context,
        images: &mut ImageStore,
        session: &AdminSession,
    ) {
        ui.group(|ui| {
            ui.label(match &self.editing {
                Some(_) => "Edit item",
                None => "New item",
            });
            egui::Grid::new("item_form").num_columns(2).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.form.name);
                ui.end_row();
                ui.label("Description");
                ui.text_edit_singleline(&mut self.form.description);
                ui.end_row();
                ui.label("Image URL");
                ui.text_edit_singleline(&mut self.form.image_url);
                ui.end_row();
                ui.label("Categories");
                ui.text_edit_singleline(&mut self.form.categories);
                ui.end_row();
                ui.label("Colors");
                ui.text_edit_singleline(&mut self.form.colors);
                ui.end_row();
                ui.label("Archetypes");
                ui.text_edit_singleline(&mut self.form.archetypes);
                ui.end_row();
                ui.label("Gender");
                ui.text_edit_singleline(&mut self.form.gender);
                ui.end_row();
                ui.label("Model category");
                egui::ComboBox::from_id_salt("replicate_category")
                    .selected_text(
                        self.form
                            .replicate_category
                            .map(|c| c.label())
                            .unwrap_or("none"),
                    )
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.form.replicate_category, None, "none");
                        for category in ReplicateCategory::ALL {
                            ui.selectable_value(
                                &mut self.form.replicate_category,
                                Some(category),
                                category.label(),
                            );
                        }
                    });
                ui.end_row();
            });
            ui.horizontal(|ui| {
                let verb = if self.editing.is_some() { "Update" } else { "Create" };
                if ui.button(verb).clicked() {
                    self.submit_item(api, ctx, session);
                }
                if self.editing.is_some() && ui.button("Stop editing").clicked() {
                    self.editing = None;
                    self.form = ItemForm::default();
                }
            });
        });

        ui.add_space(8.0);
        egui::ScrollArea::vertical().show(ui, |ui| {
            let items = self.items.clone();
            for item in &items {
                ui.horizontal(|ui| {
                    match images.get(ctx, &item.image_url).cloned() {
                        Some(texture) => {
                            let [w, h] = texture.size();
                            let size = Vec2::new(w as f32, h as f32);
                            let scale = (48.0 / size.x).min(48.0 / size.y);
                            ui.add(egui::Image::new(&texture).fit_to_exact_size(size * scale));
                        }
                        None => {
                            ui.add_sized(Vec2::splat(48.0), egui::Spinner::new());
                        }
                    }
                    ui.strong(&item.name);
                    ui.weak(item.categories.join(", "));
                    if ui.small_button("Edit").clicked() {
                        self.editing = Some(item.id.clone());
                        self.form = ItemForm::from_item(item);
                    }
                    if ui.small_button("Delete").clicked() {
                        self.delete_item(api, ctx, session, &item.id);
                    }
                });
            }
        });
    }

    fn users_tab(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        ctx: &egui::Context,
        session: &AdminSession,
    ) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("admin_users").striped(true).show(ui, |ui| {
                let users = self.users.clone();
                for user in &users {
                    ui.label(&user.email);
                    ui.label(&user.id);
                    let mut unlimited = user.unlimited_access;
                    if ui.checkbox(&mut unlimited, "unlimited").changed() {
                        self.toggle_unlimited(api, ctx, session, &user.id, unlimited);
                    }
                    ui.end_row();
                }
            });
        });
    }

    fn lookbooks_tab(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("admin_books").striped(true).show(ui, |ui| {
                for book in &self.books {
                    ui.label(&book.name);
                    ui.label(&book.person_name);
                    ui.label(format!("{} photo(s)", book.photos.len()));
                    ui.end_row();
                }
            });
        });
    }

    fn history_tab(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("admin_history").striped(true).show(ui, |ui| {
                for record in &self.history {
                    ui.label(record.created_at.format("%Y-%m-%d %H:%M").to_string());
                    ui.label(&record.description);
                    ui.hyperlink(&record.result_url);
                    ui.end_row();
                }
            });
        });
    }

    // ── requests ─────────────────────────────────────────────────

    fn fetch_tab(&mut self, api: &ApiClient, ctx: &egui::Context, session: &AdminSession) {
        match self.tab {
            AdminTab::Stats => {
                let tx = self.stats_inbox.sender();
                spawn(api, ctx, session, move |api, s| async move {
                    let _ = tx.unbounded_send(api.admin_stats(&s).await.map_err(|e| e.to_string()));
                });
            }
            AdminTab::Items => {
                let tx = self.items_inbox.sender();
                spawn(api, ctx, session, move |api, _| async move {
                    let filters = Default::default();
                    let _ =
                        tx.unbounded_send(api.fetch_items(&filters).await.map_err(|e| e.to_string()));
                });
            }
            AdminTab::Users => {
                let tx = self.users_inbox.sender();
                spawn(api, ctx, session, move |api, s| async move {
                    let _ = tx.unbounded_send(api.admin_users(&s).await.map_err(|e| e.to_string()));
                });
            }
            AdminTab::Lookbooks => {
                let tx = self.books_inbox.sender();
                spawn(api, ctx, session, move |api, s| async move {
                    let _ =
                        tx.unbounded_send(api.admin_lookbooks(&s).await.map_err(|e| e.to_string()));
                });
            }
            AdminTab::History => {
                let tx = self.history_inbox.sender();
                spawn(api, ctx, session, move |api, s| async move {
                    let _ = tx
                        .unbounded_send(api.admin_generations(&s).await.map_err(|e| e.to_string()));
                });
            }
        }
    }

    fn submit_item(&mut self, api: &ApiClient, ctx: &egui::Context, session: &AdminSession) {
        let editing = self.editing.clone();
        let item = self.form.to_item(editing.clone().unwrap_or_default());
        if item.name.is_empty() || item.image_url.is_empty() {
            let _ = self
                .item_write_inbox
                .sender()
                .unbounded_send(Err("name and image URL are required".into()));
            return;
        }
        self.editing = None;
        self.form = ItemForm::default();

        let tx = self.item_write_inbox.sender();
        spawn(api, ctx, session, move |api, s| async move {
            let result = match editing {
                Some(_) => api.update_item(&s, &item).await.map(|i| i.name),
                None => api.create_item(&s, &item).await.map(|i| i.name),
            };
            let _ = tx.unbounded_send(
                result
                    .map(|name| format!("Saved \"{name}\""))
                    .map_err(|e| e.to_string()),
            );
        });
    }

    fn delete_item(&self, api: &ApiClient, ctx: &egui::Context, session: &AdminSession, id: &str) {
        let tx = self.item_write_inbox.sender();
        let id = id.to_string();
        spawn(api, ctx, session, move |api, s| async move {
            let result = api
                .delete_item(&s, &id)
                .await
                .map(|()| "Item deleted".to_string())
                .map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
        });
    }

    fn toggle_unlimited(
        &self,
        api: &ApiClient,
        ctx: &egui::Context,
        session: &AdminSession,
        user_id: &str,
        unlimited: bool,
    ) {
        let tx = self.user_write_inbox.sender();
        let user_id = user_id.to_string();
        spawn(api, ctx, session, move |api, s| async move {
            let result = api
                .admin_set_unlimited(&s, &user_id, unlimited)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
        });
    }

    fn pump(&mut self, api: &ApiClient, ctx: &egui::Context, toasts: &mut Toasts) {
        while let Some(result) = self.login_inbox.next() {
            match result {
                Ok(session) => {
                    storage::save_admin_session(&session);
                    self.session = Some(session);
                    toasts.success("Logged in");
                }
                Err(e) => toasts.error(format!("Login failed: {e}")),
            }
        }
        while let Some(result) = self.stats_inbox.next() {
            match result {
                Ok(stats) => self.stats = Some(stats),
                Err(e) => toasts.error(format!("Could not load stats: {e}")),
            }
        }
        while let Some(result) = self.items_inbox.next() {
            match result {
                Ok(items) => self.items = items,
                Err(e) => toasts.error(format!("Could not load items: {e}")),
            }
        }
        let mut refetch_items = false;
        while let Some(result) = self.item_write_inbox.next() {
            match result {
                Ok(message) => {
                    toasts.success(message);
                    refetch_items = true;
                }
                Err(e) => toasts.error(e),
            }
        }
        while let Some(result) = self.users_inbox.next() {
            match result {
                Ok(users) => self.users = users,
                Err(e) => toasts.error(format!("Could not load users: {e}")),
            }
        }
        while let Some(result) = self.user_write_inbox.next() {
            match result {
                Ok(updated) => {
                    if let Some(user) = self.users.iter_mut().find(|u| u.id == updated.id) {
                        *user = updated;
                    }
                    toasts.success("User updated");
                }
                Err(e) => toasts.error(format!("Could not update user: {e}")),
            }
        }
        while let Some(result) = self.books_inbox.next() {
            match result {
                Ok(books) => self.books = books,
                Err(e) => toasts.error(format!("Could not load lookbooks: {e}")),
            }
        }
        while let Some(result) = self.history_inbox.next() {
            match result {
                Ok(history) => self.history = history,
                Err(e) => toasts.error(format!("Could not load history: {e}")),
            }
        }

        if refetch_items {
            if let Some(session) = self.session.clone() {
                if self.tab == AdminTab::Items {
                    let tx = self.items_inbox.sender();
                    spawn(api, ctx, &session, move |api, _| async move {
                        let filters = Default::default();
                        let _ = tx.unbounded_send(
                            api.fetch_items(&filters).await.map_err(|e| e.to_string()),
                        );
                    });
                }
            }
        }
    }
}

/// Spawn an admin request with the client, session and a repaint at the end.
/// (Bounds mirror `platform::execute`: browser futures are not `Send`.)
#[cfg(target_arch = "wasm32")]
fn spawn<F, Fut>(api: &ApiClient, ctx: &egui::Context, session: &AdminSession, task: F)
where
    F: FnOnce(ApiClient, AdminSession) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let api = api.clone();
    let session = session.clone();
    let ctx = ctx.clone();
    platform::execute(async move {
        task(api, session).await;
        ctx.request_repaint();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn<F, Fut>(api: &ApiClient, ctx: &egui::Context, session: &AdminSession, task: F)
where
    F: FnOnce(ApiClient, AdminSession) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let api = api.clone();
    let session = session.clone();
    let ctx = ctx.clone();
    platform::execute(async move {
        task(api, session).await;
        ctx.request_repaint();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting_trims_and_drops_empties() {
        assert_eq!(split_csv("a, b , ,c,"), vec!["a", "b", "c"]);
        assert_eq!(split_csv(""), Vec::<String>::new());
    }

    #[test]
    fn form_round_trips_an_item() {
        let item = ClothingItem {
            id: "42".into(),
            name: "Wrap dress".into(),
            description: "silk".into(),
            image_url: "https://cdn.example/d.jpg".into(),
            categories: vec!["dresses".into()],
            colors: vec!["red".into(), "navy".into()],
            archetypes: vec!["romantic".into()],
            gender: Some("female".into()),
            replicate_category: Some(ReplicateCategory::Dresses),
        };
        let form = ItemForm::from_item(&item);
        assert_eq!(form.colors, "red, navy");

        let back = form.to_item("42".into());
        assert_eq!(back.name, item.name);
        assert_eq!(back.colors, item.colors);
        assert_eq!(back.gender, item.gender);
        assert_eq!(back.replicate_category, item.replicate_category);
    }

    #[test]
    fn empty_gender_field_becomes_none() {
        let form = ItemForm {
            name: "x".into(),
            image_url: "y".into(),
            ..Default::default()
        };
        assert_eq!(form.to_item(String::new()).gender, None);
    }
}
