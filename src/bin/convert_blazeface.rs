// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Converts the BlazeFace short-range face detector from TFLite to
//! ONNX, downloading the pretrained TFLite file first if absent.

use std::process::ExitCode;

use faceport_core::detector;
use faceport_core::Error;
use faceport_core::HttpFetcher;
use faceport_core::Tf2OnnxConverter;

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
    println!("BlazeFace TFLite → ONNX Converter");
    rule();
    println!();
    println!("Input:  {}", detector::TFLITE_PATH);
    println!("Output: {}", detector::ONNX_PATH);
    println!();

    match detector::run(&HttpFetcher, &Tf2OnnxConverter::default()) {
        Ok(()) => {
            println!();
            rule();
            println!("✓ SUCCESS: BlazeFace ONNX model created!");
            println!("  Location: {}", detector::ONNX_PATH);
            rule();
            ExitCode::SUCCESS
        }
        Err(err @ Error::Tool { .. }) => {
            println!();
            rule();
            println!("✗ ERROR: Conversion failed");
            println!("  {err}");
            rule();
            ExitCode::FAILURE
        }
        Err(err) => {
            println!("\n\n✗ ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
