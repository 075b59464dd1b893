use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke};

use coherence_lab::kernel::{COHERENT_RATIO, RATIO_DISPLAY_MAX, RATIO_DISPLAY_MIN};
use coherence_lab::noise::SeededNoise;
use coherence_lab::theory::theory;
use coherence_lab::types::{
    FREQUENCY_RANGE, GRAVITY_RANGE, ISOLATION_RANGE, NOISE_FLOOR_RANGE, PROPOFOL_RANGE,
    TEMPERATURE_RANGE,
};
use coherence_lab::{ExperimentMode, LabSession, ParamsCell, PhysicsParams, SampleWindow};

const CYAN: Color32 = Color32::from_rgb(0x22, 0xd3, 0xee);
const ORANGE: Color32 = Color32::from_rgb(0xf9, 0x73, 0x16);
const PINK: Color32 = Color32::from_rgb(0xec, 0x48, 0x99);
const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
const GREEN: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const GRID: Color32 = Color32::from_rgb(0x1e, 0x29, 0x3b);
const CHART_BG: Color32 = Color32::from_rgb(0x02, 0x06, 0x17);

pub struct LabApp {
    session: LabSession<SeededNoise>,
    params: PhysicsParams,
    show_theory: bool,
}

impl LabApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        mode: ExperimentMode,
        params: PhysicsParams,
        seed: Option<u64>,
    ) -> Self {
        let noise = match seed {
            Some(seed) => SeededNoise::new(seed),
            None => SeededNoise::from_entropy(),
        };
        let cell = ParamsCell::new(params);

        Self {
            session: LabSession::new(noise, cell, mode),
            params,
            show_theory: true,
        }
    }

    fn sync_params(&self) {
        if self.session.params().load() != self.params {
            self.session.params().store(self.params);
        }
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Coherence Protocol Lab");
            ui.separator();

            let active = self.session.mode();
            for mode in ExperimentMode::ALL {
                let label = match mode {
                    ExperimentMode::A => "Exp A: Superradiance",
                    ExperimentMode::B => "Exp B: Gravity",
                    ExperimentMode::C => "Exp C: Entrainment",
                };
                if ui.selectable_label(active == mode, label).clicked() {
                    self.session.set_mode(mode);
                }
            }

            ui.separator();
            if ui.selectable_label(self.show_theory, "Theory log").clicked() {
                self.show_theory = !self.show_theory;
            }
        });
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        let mode = self.session.mode();
        let info = theory(mode);
        ui.heading(info.title);
        ui.label(info.tagline);
        ui.separator();

        ui.horizontal(|ui| {
            let label = if self.session.is_running() {
                "Pause"
            } else {
                "Start simulation"
            };
            if ui.button(label).clicked() {
                self.session.toggle();
            }
            if ui.button("Clear").clicked() {
                self.session.reset();
            }
        });

        ui.separator();
        match mode {
            ExperimentMode::A => {
                ui.add(
                    egui::Slider::new(&mut self.params.propofol, PROPOFOL_RANGE)
                        .text("propofol (%)"),
                );
                ui.add(
                    egui::Slider::new(&mut self.params.temperature, TEMPERATURE_RANGE)
                        .text("temperature (K)"),
                );
            }
            ExperimentMode::B => {
                ui.add(
                    egui::Slider::new(&mut self.params.gravity, GRAVITY_RANGE)
                        .text("gravity coupling"),
                );
                ui.add(
                    egui::Slider::new(&mut self.params.isolation, ISOLATION_RANGE)
                        .text("isolation (%)"),
                );
            }
            ExperimentMode::C => {
                ui.add(
                    egui::Slider::new(&mut self.params.frequency, FREQUENCY_RANGE)
                        .text("frequency (Hz)"),
                );
                ui.add(
                    egui::Slider::new(&mut self.params.noise_floor, NOISE_FLOOR_RANGE)
                        .text("noise floor"),
                );
            }
        }

        ui.separator();
        let window = self.session.window();
        let current = window.latest().map(|s| s.value).unwrap_or(0.0);
        ui.label(format!("{}: {current:.3}", info.value_label));
        if let Some(mean) = window.mean_value() {
            ui.label(format!("window mean: {mean:.3}"));
        }
        ui.label(format!("samples: {}/{}", window.len(), window.capacity()));
        ui.horizontal(|ui| {
            let (dot, status) = if self.session.is_running() {
                (GREEN, "LIVE")
            } else {
                (Color32::GRAY, "OFFLINE")
            };
            ui.colored_label(dot, "●");
            ui.monospace(status);
        });
    }

    fn draw_theory(&self, ui: &mut egui::Ui) {
        let info = theory(self.session.mode());
        ui.heading("Theory Log");
        ui.separator();
        ui.label(egui::RichText::new("HYPOTHESIS").color(CYAN).monospace());
        ui.label(info.hypothesis);
        ui.add_space(8.0);
        ui.label(egui::RichText::new("GOVERNING EQUATION").color(ORANGE).monospace());
        ui.code(info.equation);
        ui.add_space(8.0);
        ui.label(egui::RichText::new("MECHANISM").monospace());
        ui.label(info.mechanism);
        ui.add_space(8.0);
        ui.label(egui::RichText::new("CONTROLS").monospace());
        for control in info.controls {
            ui.label(format!("• {control}"));
        }
        ui.add_space(8.0);
        ui.label(egui::RichText::new(info.citation).italics());
    }

    fn draw_chart(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 8.0, CHART_BG);
        let plot = rect.shrink(24.0);

        for i in 0..=4 {
            let y = plot.top() + plot.height() * i as f32 / 4.0;
            painter.line_segment(
                [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
                Stroke::new(1.0, GRID),
            );
        }

        let mode = self.session.mode();
        let window = self.session.window();
        let (lo, hi) = value_domain(mode, window);
        let info = theory(mode);
        let line_color = match mode {
            ExperimentMode::A => CYAN,
            ExperimentMode::B => ORANGE,
            ExperimentMode::C => PINK,
        };

        let threshold = coherence_lab::kernel::threshold_for(mode);
        let threshold_color = if mode == ExperimentMode::A { RED } else { GREEN };
        reference_line(&painter, plot, lo, hi, threshold, threshold_color, info.threshold_label);
        if mode == ExperimentMode::A {
            reference_line(
                &painter,
                plot,
                lo,
                hi,
                COHERENT_RATIO,
                GREEN,
                "Superradiant (Coherent)",
            );
        }

        let slots = (window.capacity().max(2) - 1) as f32;
        let points: Vec<Pos2> = window
            .iter()
            .enumerate()
            .map(|(idx, sample)| {
                let x = plot.left() + plot.width() * idx as f32 / slots;
                Pos2::new(x, to_screen_y(plot, lo, hi, sample.value))
            })
            .collect();
        if points.len() > 1 {
            painter.add(Shape::line(points, Stroke::new(2.0, line_color)));
        }

        painter.text(
            Pos2::new(rect.left() + 6.0, rect.top() + 4.0),
            Align2::LEFT_TOP,
            format!("{} [{lo:.1} .. {hi:.1}]", info.value_label),
            FontId::monospace(11.0),
            Color32::from_rgb(0x47, 0x55, 0x69),
        );
    }
}

impl eframe::App for LabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_params();

        if self.session.is_running() {
            let timestamp_ms = ctx.input(|i| i.time) * 1000.0;
            self.session.frame(timestamp_ms);
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.draw_header(ui);
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(290.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_controls(ui);
                    });
            });

        if self.show_theory {
            egui::SidePanel::right("theory")
                .resizable(true)
                .default_width(300.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| self.draw_theory(ui));
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_chart(ui);
        });

        if self.session.is_running() {
            ctx.request_repaint();
        }
    }
}

fn value_domain(mode: ExperimentMode, window: &SampleWindow) -> (f64, f64) {
    match mode {
        ExperimentMode::A => (RATIO_DISPLAY_MIN, RATIO_DISPLAY_MAX),
        ExperimentMode::B => {
            let peak = window.value_bounds().map(|(_, hi)| hi).unwrap_or(0.0);
            (0.0, (peak * 1.1).max(600.0))
        }
        ExperimentMode::C => (0.0, 100.0),
    }
}

fn to_screen_y(plot: Rect, lo: f64, hi: f64, value: f64) -> f32 {
    let norm = ((value - lo) / (hi - lo).max(1.0e-9)).clamp(0.0, 1.0) as f32;
    plot.bottom() - norm * plot.height()
}

fn reference_line(
    painter: &egui::Painter,
    plot: Rect,
    lo: f64,
    hi: f64,
    value: f64,
    color: Color32,
    label: &str,
) {
    let y = to_screen_y(plot, lo, hi, value);
    let segment = [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)];
    painter.extend(Shape::dashed_line(&segment, Stroke::new(1.0, color), 6.0, 6.0));
    painter.text(
        Pos2::new(plot.right() - 4.0, y - 2.0),
        Align2::RIGHT_BOTTOM,
        label,
        FontId::proportional(12.0),
        color,
    );
}
