//! App shell: screen routing, the wallet chip, shared stores, and the
//! startup resume of a checkpointed generation job.

use crate::api::ApiClient;
use crate::config::Endpoints;
use crate::images::ImageStore;
use crate::inbox::Inbox;
use crate::models::BalanceInfo;
use crate::storage;
use crate::ui::admin::AdminScreen;
use crate::ui::catalog::{CatalogAction, CatalogScreen};
use crate::ui::lookbooks::LookbooksScreen;
use crate::ui::toasts::Toasts;
use crate::ui::tryon::{TryOnAction, TryOnScreen};
use crate::ui::wallet::{self, WalletScreen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    TryOn,
    Catalog,
    Lookbooks,
    Wallet,
    Admin,
}

pub struct StyleSelectApp {
    screen: Screen,
    api: ApiClient,
    images: ImageStore,
    toasts: Toasts,
    balance: Option<BalanceInfo>,
    balance_inbox: Inbox<Result<BalanceInfo, String>>,
    tryon: TryOnScreen,
    catalog: CatalogScreen,
    lookbooks: LookbooksScreen,
    wallet: WalletScreen,
    admin: AdminScreen,
}

impl StyleSelectApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let api = ApiClient::new(Endpoints::load());
        let mut app = Self {
            screen: Screen::TryOn,
            api,
            images: ImageStore::new(),
            toasts: Toasts::default(),
            balance: None,
            balance_inbox: Inbox::new(),
            tryon: TryOnScreen::default(),
            catalog: CatalogScreen::default(),
            lookbooks: LookbooksScreen::default(),
            wallet: WalletScreen::default(),
            admin: AdminScreen::default(),
        };

        wallet::refresh_balance(&app.api, &app.balance_inbox.sender(), &cc.egui_ctx);

        // A reload mid-generation picks the job back up instead of losing it.
        if let Some(pending) = storage::load_pending_generation() {
            app.tryon.resume(&app.api, pending, &cc.egui_ctx);
            app.toasts.info("Resuming your generation…");
        }

        app
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("StyleSelect");
                ui.separator();
                ui.selectable_value(&mut self.screen, Screen::TryOn, "Try-on");
                ui.selectable_value(&mut self.screen, Screen::Catalog, "Catalog");
                ui.selectable_value(&mut self.screen, Screen::Lookbooks, "Lookbooks");
                ui.selectable_value(&mut self.screen, Screen::Wallet, "Wallet");
                ui.selectable_value(&mut self.screen, Screen::Admin, "Admin");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &self.balance {
                        Some(balance) if balance.unlimited_access => {
                            ui.colored_label(egui::Color32::GOLD, "unlimited");
                        }
                        Some(balance) => {
                            ui.label(format!(
                                "tries: {} free / {} paid",
                                balance.free_tries_remaining, balance.paid_tries_available
                            ));
                        }
                        None => {
                            ui.weak("…");
                        }
                    }
                    if ui.small_button("⟳").clicked() {
                        wallet::refresh_balance(&self.api, &self.balance_inbox.sender(), ctx);
                    }
                });
            });
        });
    }
}

impl eframe::App for StyleSelectApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some(result) = self.balance_inbox.next() {
            match result {
                Ok(balance) => self.balance = Some(balance),
                Err(e) => log::warn!("balance refresh failed: {e}"),
            }
        }

        self.top_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::TryOn => {
                let action = self.tryon.show(
                    ui,
                    &self.api,
                    &mut self.images,
                    &mut self.toasts,
                    self.balance.as_ref(),
                    &self.balance_inbox.sender(),
                );
                if let Some(TryOnAction::BrowseCatalog) = action {
                    self.screen = Screen::Catalog;
                }
            }
            Screen::Catalog => {
                let action =
                    self.catalog
                        .show(ui, &self.api, &mut self.images, &mut self.toasts);
                if let Some(CatalogAction::TryOn(item)) = action {
                    self.toasts.success(format!("\"{}\" selected", item.name));
                    self.tryon.set_garment_from_catalog(&item);
                    self.screen = Screen::TryOn;
                }
            }
            Screen::Lookbooks => {
                self.lookbooks
                    .show(ui, &self.api, &mut self.images, &mut self.toasts);
            }
            Screen::Wallet => {
                self.wallet
                    .show(ui, &self.api, &mut self.toasts, self.balance.as_ref());
            }
            Screen::Admin => {
                self.admin
                    .show(ui, &self.api, &mut self.images, &mut self.toasts);
            }
        });

        self.toasts.show(ctx);
    }
}
