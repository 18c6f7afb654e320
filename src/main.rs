use livecode_playground::sim::{SimInstrument, SimRig};
use livecode_playground::ui::app::PlaygroundApp;
use livecode_playground::ui::widget::TimelineWidget;
use livecode_playground::{EventBus, TimelineConfig, TimelineViz};
use std::sync::Arc;

const DEMO_BPM: u32 = 120;

fn main() {
    env_logger::init();

    println!("=== Livecode Playground ===");
    println!("Version 0.3.0\n");

    // The simulated host: an event bus and a rig of live instruments.
    let bus = EventBus::new();
    let rig = Arc::new(SimRig::new());
    rig.insert(
        "drums",
        SimInstrument::new("EDrum808").with_values(vec![1.0, 0.0, 1.0, 0.0]),
    );
    rig.insert(
        "bass",
        SimInstrument::new("Mono").with_values(vec![0.0, 0.0, 7.0, 5.0]),
    );
    rig.insert(
        "lead",
        SimInstrument::new("PolySynth").with_values(vec![0.0, 4.0, 7.0, 12.0]),
    );

    println!("Timeline engine initialisation...");
    let widget = TimelineWidget::new();
    let mut viz = TimelineViz::init(
        bus.clone(),
        rig.clone(),
        widget.surface(),
        TimelineConfig::default(),
    );
    viz.start();

    println!("\n=== Playground started ! ===\n");
    println!("Graphical UI launching...\n");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 650.0])
            .with_title("Livecode Playground"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "Livecode Playground",
        native_options,
        Box::new(move |_cc| {
            let app = PlaygroundApp::new(bus, rig, viz, widget, DEMO_BPM);
            Ok(Box::new(app))
        }),
    );
}
