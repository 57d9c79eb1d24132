//! Wallet screen: balance, try counters, transaction log, top-up redirect.

use futures_channel::mpsc::UnboundedSender;

use crate::api::ApiClient;
use crate::inbox::Inbox;
use crate::models::{BalanceInfo, Transaction};
use crate::platform;
use crate::ui::toasts::Toasts;

/// Re-fetch the wallet state into the shell's balance inbox. Shared by the
/// top bar refresh, the deduction path and the payment return.
pub fn refresh_balance(
    api: &ApiClient,
    tx: &UnboundedSender<Result<BalanceInfo, String>>,
    ctx: &egui::Context,
) {
    let api = api.clone();
    let tx = tx.clone();
    let ctx = ctx.clone();
    platform::execute(async move {
        let result = api.fetch_balance().await.map_err(|e| e.to_string());
        let _ = tx.unbounded_send(result);
        ctx.request_repaint();
    });
}

pub struct WalletScreen {
    transactions: Option<Vec<Transaction>>,
    transactions_inbox: Inbox<Result<Vec<Transaction>, String>>,
    payment_inbox: Inbox<Result<String, String>>,
    top_up_amount: i64,
    started: bool,
}

impl Default for WalletScreen {
    fn default() -> Self {
        Self {
            transactions: None,
            transactions_inbox: Inbox::new(),
            payment_inbox: Inbox::new(),
            top_up_amount: 10,
            started: false,
        }
    }
}

impl WalletScreen {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        api: &ApiClient,
        toasts: &mut Toasts,
        balance: Option<&BalanceInfo>,
    ) {
        let ctx = ui.ctx().clone();
        if !self.started {
            self.started = true;
            self.fetch_transactions(api, &ctx);
        }

        while let Some(result) = self.transactions_inbox.next() {
            match result {
                Ok(list) => self.transactions = Some(list),
                Err(e) => toasts.error(format!("Could not load transactions: {e}")),
            }
        }
        while let Some(result) = self.payment_inbox.next() {
            match result {
                // leaving the page; the payment provider takes over
                Ok(url) => platform::open_url(&url),
                Err(e) => toasts.error(format!("Could not start checkout: {e}")),
            }
        }

        ui.heading("Wallet");
        match balance {
            None => {
                ui.spinner();
            }
            Some(balance) => {
                ui.horizontal(|ui| {
                    ui.label(format!("Balance: {}", balance.balance));
                    ui.separator();
                    ui.label(format!("Free tries: {}", balance.free_tries_remaining));
                    ui.separator();
                    ui.label(format!("Paid tries: {}", balance.paid_tries_available));
                    if balance.unlimited_access {
                        ui.separator();
                        ui.colored_label(egui::Color32::GOLD, "unlimited");
                    }
                });

                ui.add_space(8.0);
                ui.group(|ui| {
                    ui.label("Top up");
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::DragValue::new(&mut self.top_up_amount)
                                .speed(1)
                                .range(1..=500),
                        );
                        if ui.button("Buy tries").clicked() {
                            match &balance.user_id {
                                Some(user_id) => self.start_payment(api, &ctx, user_id),
                                None => toasts.error("Sign in before buying tries"),
                            }
                        }
                    });
                });
            }
        }

        ui.add_space(12.0);
        ui.heading("Transactions");
        match &self.transactions {
            None => {
                ui.spinner();
            }
            Some(list) if list.is_empty() => {
                ui.weak("No transactions yet.");
            }
            Some(list) => {
                egui::ScrollArea::vertical().max_height(280.0).show(ui, |ui| {
                    egui::Grid::new("transactions").striped(true).show(ui, |ui| {
                        for tx in list {
                            let when = tx
                                .created_at
                                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_default();
                            ui.label(when);
                            ui.label(&tx.description);
                            ui.label(format!("{:+}", tx.amount));
                            ui.end_row();
                        }
                    });
                });
            }
        }
    }

    fn fetch_transactions(&mut self, api: &ApiClient, ctx: &egui::Context) {
        let tx = self.transactions_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        platform::execute(async move {
            let result = api.fetch_transactions().await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }

    fn start_payment(&mut self, api: &ApiClient, ctx: &egui::Context, user_id: &str) {
        let tx = self.payment_inbox.sender();
        let api = api.clone();
        let ctx = ctx.clone();
        let user_id = user_id.to_string();
        let amount = self.top_up_amount;
        platform::execute(async move {
            let result = api
                .create_payment(&user_id, amount)
                .await
                .map(|r| r.payment_url)
                .map_err(|e| e.to_string());
            let _ = tx.unbounded_send(result);
            ctx.request_repaint();
        });
    }
}
