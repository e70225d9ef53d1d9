//! Shader stage compilation and program linking.
//!
//! Failures are logged with the object's label and never abort: a failed
//! stage comes back as [`ShaderHandle::NULL`], a failed link as an invalid
//! [`GpuProgram`] that refuses to bind.

use log::{error, warn};

use super::{GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage};
use crate::error::ViewerError;

/// Compiles one stage. On failure the diagnostic is logged, the stage object
/// is deleted and the null handle is returned.
pub fn compile_stage(
    device: &mut dyn GraphicsDevice,
    source: &str,
    stage: ShaderStage,
    label: &str,
) -> ShaderHandle {
    let shader = device.create_shader(stage, label);
    match device.compile_shader(shader, source) {
        Ok(()) => shader,
        Err(log) => {
            let err = ViewerError::CompileFailure {
                label: label.to_string(),
                log,
            };
            error!("{err}");
            device.delete_shader(shader);
            ShaderHandle::NULL
        }
    }
}

/// Attaches every non-null stage, links, and deletes the stages afterwards
/// whatever the outcome.
pub fn link(device: &mut dyn GraphicsDevice, stages: &[ShaderHandle], label: &str) -> GpuProgram {
    let handle = device.create_program(label);
    for &stage in stages.iter().filter(|stage| !stage.is_null()) {
        device.attach_shader(handle, stage);
    }
    let valid = match device.link_program(handle) {
        Ok(()) => true,
        Err(log) => {
            let err = ViewerError::LinkFailure {
                label: label.to_string(),
                log,
            };
            error!("{err}");
            false
        }
    };
    for &stage in stages.iter().filter(|stage| !stage.is_null()) {
        device.delete_shader(stage);
    }
    GpuProgram {
        handle,
        label: label.to_string(),
        valid,
        reported: false,
    }
}

/// Compiles a vertex and fragment stage and links them into one program.
pub fn build(
    device: &mut dyn GraphicsDevice,
    vertex_source: &str,
    fragment_source: &str,
    label: &str,
) -> GpuProgram {
    let vertex = compile_stage(device, vertex_source, ShaderStage::Vertex, &format!("{label}.vs"));
    let fragment = compile_stage(
        device,
        fragment_source,
        ShaderStage::Fragment,
        &format!("{label}.fs"),
    );
    link(device, &[vertex, fragment], label)
}

/// A linked (or failed) program object.
#[derive(Debug)]
pub struct GpuProgram {
    handle: ProgramHandle,
    label: String,
    valid: bool,
    reported: bool,
}

impl GpuProgram {
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Makes the program current. An invalid program is reported once and
    /// `false` is returned so the caller skips its draw.
    pub fn bind(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        if self.valid {
            device.use_program(Some(self.handle));
            return true;
        }
        if !self.reported {
            warn!("skipping draws of `{}`: program failed to link", self.label);
            self.reported = true;
        }
        false
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.delete_program(self.handle);
    }
}
