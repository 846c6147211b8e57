//! Instancing of variable fonts, single and batch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
pub use font_instancer::AxisLocation;
use font_instancer::{instantiate, instantiate_static};
use log::info;

use crate::{
    io::{read_font, write_font},
    report::Reporter,
};

/// Pin `axes` of `input` and write the result to `output`.
///
/// Axes left out stay variable.
pub fn create_instance(input: &Path, output: &Path, axes: &[AxisLocation]) -> Result<()> {
    let data = read_font(input)?;

    let axis_desc: Vec<String> = axes.iter().map(|a| format!("{}={}", a.tag, a.value)).collect();
    info!("Creating instance with axes: {}", axis_desc.join(", "));

    let instance = instantiate(&data, axes)
        .with_context(|| format!("Failed to instantiate {}", input.display()))?;
    write_font(output, &instance)?;

    let input_size = data.len() as f64 / 1024.0 / 1024.0;
    let output_size = instance.len() as f64 / 1024.0 / 1024.0;
    info!(
        "Instance created: {} ({input_size:.2} MB) -> {} ({output_size:.2} MB)",
        input.display(),
        output.display()
    );
    Ok(())
}

/// Named static instance for batch processing.
#[derive(Debug, Clone)]
pub struct InstanceDef {
    pub name: String,
    pub axes: Vec<AxisLocation>,
}

impl InstanceDef {
    pub fn new(name: impl Into<String>, axes: Vec<AxisLocation>) -> Self {
        Self { name: name.into(), axes }
    }

    fn output(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.ttf", self.name))
    }
}

/// Write one static font per definition to `{output_dir}/{name}.ttf`.
///
/// Axes a definition leaves out are pinned at their defaults.
pub fn create_instances_batch(
    reporter: &Reporter,
    input: &Path,
    output_dir: &Path,
    instances: &[InstanceDef],
) -> Result<usize> {
    info!("Creating {} instances from {}", instances.len(), input.display());
    let data = read_font(input)?;

    reporter.run_batch_with(
        "Create instances",
        instances,
        |inst| inst.output(output_dir),
        |inst| {
            let static_data = instantiate_static(&data, &inst.axes)
                .with_context(|| format!("Failed to instantiate {}", inst.name))?;
            let output = inst.output(output_dir);
            write_font(&output, static_data)?;
            info!("  Created: {}", output.display());
            Ok(())
        },
    )
}
