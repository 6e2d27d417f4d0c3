#![forbid(unsafe_code)]

//! Bindwire demo binary entry point.
//!
//! The main thread plays the UI thread: it owns the [`UiRuntime`], performs
//! the simulated user input and drains queued view updates. A background
//! thread edits the model the way a worker or network callback would.

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use bindwire_demo::cli::Opts;
use bindwire_demo::{DemoApp, MainModel};
use bindwire_harness::standard_registry;
use bindwire_runtime::{Marshaller, MarshallerConfig, UiRuntime};
use tracing::{info, warn};

fn main() {
    let opts = Opts::parse();

    if let Err(err) = bindwire_core::logging::init_tracing() {
        eprintln!("Logging disabled: {err}");
    }

    let runtime = UiRuntime::new();
    let env_config = MarshallerConfig::from_env();
    let config = env_config
        .with_headless(opts.headless || env_config.headless)
        .with_blocking_view_updates(opts.blocking || env_config.blocking_view_updates);
    let marshaller = match Marshaller::initialize_with_config(Some(&runtime), config) {
        Ok(marshaller) => marshaller,
        Err(err) => {
            eprintln!("Failed to initialize: {err}");
            process::exit(1);
        }
    };

    let app = match DemoApp::assemble(marshaller, standard_registry()) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Failed to bind the form: {err}");
            process::exit(1);
        }
    };
    info!(model = ?app.model.snapshot(), "Form ready");

    // User input, on the UI thread.
    app.view.line_edit.type_text("hello");
    app.view.check_box.button.click();
    app.view.radios.select(0);
    info!(
        label = %app.view.label.text(),
        radio = ?app.view.radios.selected(),
        "After user input"
    );

    let finished = Arc::new(AtomicBool::new(false));
    let worker = {
        let model = Arc::clone(&app.model);
        let finished = Arc::clone(&finished);
        let edits = opts.edits;
        thread::Builder::new()
            .name("bindwire-worker".into())
            .spawn(move || {
                MainModel::BUTTON_ENABLED.set(&model, true);
                for i in 1..=edits {
                    MainModel::EDIT_TEXT.set(&model, format!("background edit {i}"));
                }
                finished.store(true, Ordering::Release);
            })
    };
    let worker = match worker {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Failed to spawn worker: {err}");
            process::exit(1);
        }
    };

    let applied = runtime.run_until(|| finished.load(Ordering::Acquire)) + runtime.process_pending();
    if worker.join().is_err() {
        warn!("Worker thread panicked");
    }
    info!(applied, "Background edits applied");

    app.view.push_button.click();
    app.view.dialog.accept();

    let snapshot = app.model.snapshot();
    info!(model = ?snapshot, "Final model");
    println!("edit:    {}", app.view.line_edit.text());
    println!("label:   {}", app.view.label.text());
    println!("checked: {}", app.view.check_box.button.is_checked());
    let button = if app.view.push_button.button.widget.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };
    println!("button:  {button}");
    println!("radio:   {:?}", app.view.radios.selected());
    println!("dialog:  {}", app.view.dialog.result());
    println!("model:   {snapshot:?}");
}
