// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exports the MiniFASNetV2 anti-spoofing classifier architecture to
//! ONNX. No pretrained weights are loaded.

use std::path::Path;
use std::process::ExitCode;

use faceport_core::spoof;

fn rule() {
    println!("{}", "=".repeat(60));
}

fn main() -> ExitCode {
    // Enable logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    ctrlc::set_handler(|| {
        println!("\n\nCancelled by user");
        std::process::exit(1);
    })
    .expect("Unable to install the interrupt handler");

    rule();
    println!("MiniFASNetV2 → ONNX Exporter");
    rule();
    println!();
    println!("Output: {}", spoof::OUTPUT_PATH);
    println!();

    match spoof::export_architecture(Path::new(spoof::OUTPUT_PATH)) {
        Ok(()) => {
            println!();
            rule();
            println!("✓ SUCCESS: MiniFASNetV2 ONNX model created!");
            println!("  Location: {}", spoof::OUTPUT_PATH);
            println!();
            println!("⚠️  NOTE: This is the model ARCHITECTURE only.");
            println!("   For production, download pretrained weights from:");
            println!("   https://github.com/minivision-ai/Silent-Face-Anti-Spoofing");
            rule();
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!();
            rule();
            println!("✗ ERROR: Export failed - {err}");
            rule();
            ExitCode::FAILURE
        }
    }
}
