use chrono::{DateTime, Local};
use client_core::{
    forms::{DriverForm, LocationForm, OrderForm, RouteForm},
    view::SelectOption,
    ControlHandle, Fragment, Notice, Region, ViewState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::LocationId;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{FormKind, UiEvent},
        orchestration::dispatch_backend_command,
    },
};

const NOTICE_LOG_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

#[derive(Debug, Clone)]
struct NoticeEntry {
    at: DateTime<Local>,
    notice: Notice,
}

pub struct DispatchApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ViewState,
    location_form: LocationForm,
    order_form: OrderForm,
    driver_form: DriverForm,
    route_form: RouteForm,
    notices: Vec<NoticeEntry>,
    status: String,
    status_banner: Option<StatusBanner>,
    in_flight: usize,
}

fn status_color(class: &str) -> egui::Color32 {
    match class {
        "status-pending" => egui::Color32::from_rgb(214, 158, 46),
        "status-assigned" => egui::Color32::from_rgb(66, 153, 225),
        "status-in-transit" => egui::Color32::from_rgb(128, 90, 213),
        "status-delivered" => egui::Color32::from_rgb(72, 187, 120),
        _ => egui::Color32::GRAY,
    }
}

/// Drops a picked location that is no longer offered.
fn retain_selection(selected: &mut Option<LocationId>, options: &[SelectOption]) {
    if selected.is_some() && !options.iter().any(|option| option.value == *selected) {
        *selected = None;
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn location_picker(
    ui: &mut egui::Ui,
    id_salt: &str,
    options: &[SelectOption],
    selected: &mut Option<LocationId>,
) {
    let selected_text = options
        .iter()
        .find(|option| option.value == *selected)
        .or_else(|| options.first())
        .map(|option| option.label.clone())
        .unwrap_or_default();

    egui::ComboBox::from_id_salt(id_salt)
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(&mut *selected, option.value, &option.label);
            }
        });
}

/// Paints a mounted region. Buttons take their handles from
/// `Region::controls`, which walks the tree in the same order as painting.
fn paint_region(ui: &mut egui::Ui, region: &Region, activated: &mut Vec<ControlHandle>) {
    let handles: Vec<ControlHandle> = region
        .controls()
        .into_iter()
        .map(|(handle, _)| handle)
        .collect();
    let mut slot = 0;
    ui.push_id((region.kind().label(), region.generation()), |ui| {
        paint_fragments(ui, &handles, region.tree(), &mut slot, activated);
    });
}

fn paint_fragments(
    ui: &mut egui::Ui,
    handles: &[ControlHandle],
    fragments: &[Fragment],
    slot: &mut usize,
    activated: &mut Vec<ControlHandle>,
) {
    for fragment in fragments {
        match fragment {
            Fragment::Empty(text) => {
                ui.weak(text);
            }
            Fragment::Heading(text) => {
                ui.label(egui::RichText::new(text).strong());
            }
            Fragment::Text(text) => {
                ui.label(text);
            }
            Fragment::Status { label, class } => {
                ui.colored_label(status_color(class), label);
            }
            Fragment::Error(text) => {
                ui.colored_label(egui::Color32::from_rgb(229, 62, 62), text);
            }
            Fragment::Control(control) => {
                let handle = handles.get(*slot).copied();
                *slot += 1;
                if ui.button(&control.label).clicked() {
                    if let Some(handle) = handle {
                        activated.push(handle);
                    }
                }
            }
            Fragment::Item(children) => {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    paint_fragments(ui, handles, children, slot, activated);
                });
            }
            Fragment::Disclosure { visible, children } => {
                if *visible {
                    ui.indent(("disclosure", *slot), |ui| {
                        paint_fragments(ui, handles, children, slot, activated);
                    });
                }
            }
        }
    }
}

impl DispatchApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: ViewState::default(),
            location_form: LocationForm::default(),
            order_form: OrderForm::default(),
            driver_form: DriverForm::default(),
            route_form: RouteForm::default(),
            notices: Vec::new(),
            status: "Loading dispatch data...".to_string(),
            status_banner: None,
            in_flight: 0,
        };
        app.send(BackendCommand::LoadAll);
        app
    }

    fn send(&mut self, cmd: BackendCommand) {
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.in_flight += 1;
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::ViewChanged(view) => {
                    self.view = *view;
                    let selections = &self.view.selections;
                    retain_selection(&mut self.order_form.restaurant, &selections.restaurant);
                    retain_selection(&mut self.order_form.customer, &selections.customer);
                    retain_selection(&mut self.route_form.start, &selections.route_start);
                    retain_selection(&mut self.route_form.end, &selections.route_end);
                }
                UiEvent::ActionFinished { form, notice } => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    match notice {
                        Some(notice) => self.record_notice(form, notice),
                        None if self.in_flight == 0 => self.status = "Ready".to_string(),
                        None => {}
                    }
                }
                UiEvent::BackendFailed(message) => {
                    self.status = "Backend worker unavailable".to_string();
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Error,
                        message,
                    });
                }
            }
        }
    }

    fn record_notice(&mut self, form: Option<FormKind>, notice: Notice) {
        self.status = first_line(&notice.text).to_string();
        if notice.is_error() {
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: notice.text.clone(),
            });
        } else {
            self.status_banner = None;
            match form {
                Some(FormKind::Location) => self.location_form = LocationForm::default(),
                Some(FormKind::Order) => self.order_form = OrderForm::default(),
                Some(FormKind::Driver) => self.driver_form = DriverForm::default(),
                Some(FormKind::Route) | None => {}
            }
        }

        self.notices.push(NoticeEntry {
            at: Local::now(),
            notice,
        });
        if self.notices.len() > NOTICE_LOG_LIMIT {
            let excess = self.notices.len() - NOTICE_LOG_LIMIT;
            self.notices.drain(..excess);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_forms(&mut self, ui: &mut egui::Ui) {
        let mut submitted = Vec::new();

        ui.heading("Add Location");
        egui::Grid::new("location_form_grid")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("ID");
                ui.text_edit_singleline(&mut self.location_form.id);
                ui.end_row();
                ui.label("Name");
                ui.text_edit_singleline(&mut self.location_form.name);
                ui.end_row();
                ui.label("X");
                ui.text_edit_singleline(&mut self.location_form.x);
                ui.end_row();
                ui.label("Y");
                ui.text_edit_singleline(&mut self.location_form.y);
                ui.end_row();
            });
        if ui.button("Add Location").clicked() {
            submitted.push(BackendCommand::AddLocation(self.location_form.clone()));
        }
        ui.separator();

        ui.heading("Place Order");
        location_picker(
            ui,
            "order_restaurant",
            &self.view.selections.restaurant,
            &mut self.order_form.restaurant,
        );
        location_picker(
            ui,
            "order_customer",
            &self.view.selections.customer,
            &mut self.order_form.customer,
        );
        if ui.button("Place Order").clicked() {
            submitted.push(BackendCommand::PlaceOrder(self.order_form));
        }
        ui.separator();

        ui.heading("Add Driver");
        ui.horizontal(|ui| {
            ui.label("Speed");
            ui.text_edit_singleline(&mut self.driver_form.speed);
        });
        if ui.button("Add Driver").clicked() {
            submitted.push(BackendCommand::AddDriver(self.driver_form.clone()));
        }
        ui.separator();

        ui.heading("Find Route");
        location_picker(
            ui,
            "route_start",
            &self.view.selections.route_start,
            &mut self.route_form.start,
        );
        location_picker(
            ui,
            "route_end",
            &self.view.selections.route_end,
            &mut self.route_form.end,
        );
        if ui.button("Find Route").clicked() {
            submitted.push(BackendCommand::FindRoute(self.route_form));
        }
        if self.view.route_result.is_mounted() {
            let mut ignored = Vec::new();
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                paint_region(ui, &self.view.route_result, &mut ignored);
            });
        }

        for cmd in submitted {
            self.send(cmd);
        }
    }

    fn show_collections(&mut self, ui: &mut egui::Ui) {
        let mut activated = Vec::new();

        ui.columns(3, |columns| {
            let regions = [
                ("Locations", &self.view.locations),
                ("Orders", &self.view.orders),
                ("Drivers", &self.view.drivers),
            ];
            for (column, (title, region)) in columns.iter_mut().zip(regions) {
                column.heading(title);
                egui::ScrollArea::vertical()
                    .id_salt(region.kind().label())
                    .auto_shrink([false, false])
                    .show(column, |ui| paint_region(ui, region, &mut activated));
            }
        });

        for handle in activated {
            self.send(BackendCommand::Activate(handle));
        }
    }

    fn show_notice_log(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("notice_log")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in &self.notices {
                    let stamp = entry.at.format("%H:%M:%S").to_string();
                    let text = format!("[{stamp}] {}", entry.notice.text);
                    if entry.notice.is_error() {
                        ui.colored_label(egui::Color32::from_rgb(229, 62, 62), text);
                    } else {
                        ui.label(text);
                    }
                }
            });
    }
}

impl eframe::App for DispatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.in_flight > 0 {
                    ui.spinner();
                }
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.send(BackendCommand::LoadAll);
                    }
                });
            });
            self.show_status_banner(ui);
        });

        egui::TopBottomPanel::bottom("notice_panel")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.heading("Notices");
                self.show_notice_log(ui);
            });

        egui::SidePanel::left("forms_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("forms_scroll")
                    .show(ui, |ui| self.show_forms(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| self.show_collections(ui));

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
