//! WGSL shader compilation with up-front validation.
//!
//! Sources are parsed and validated with `naga` before they reach the device,
//! and the entry points and vertex inputs a pipeline relies on are checked
//! first, so failures surface as [`ShaderError`] instead of through wgpu's
//! uncaptured-error handler.

use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, ShaderStage, TypeInner};

/// A shader that failed to compile or cannot back the requested pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The WGSL source does not parse.
    Parse { label: String, diagnostic: String },
    /// The source parses but fails naga validation.
    Validation { label: String, diagnostic: String },
    /// The pipeline names an entry point the module does not define for that stage.
    MissingEntryPoint {
        label: String,
        name: String,
        stage: ShaderStage,
    },
    /// A vertex input location has no matching attribute in the buffer layouts.
    UnboundVertexInput {
        label: String,
        entry_point: String,
        location: u32,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Parse { label, diagnostic } => {
                write!(f, "shader `{label}` failed to compile:\n{diagnostic}")
            }
            ShaderError::Validation { label, diagnostic } => {
                write!(f, "shader `{label}` failed validation:\n{diagnostic}")
            }
            ShaderError::MissingEntryPoint { label, name, stage } => {
                write!(f, "shader `{label}` has no {stage:?} entry point `{name}`")
            }
            ShaderError::UnboundVertexInput {
                label,
                entry_point,
                location,
            } => write!(
                f,
                "pipeline for shader `{label}`: `{entry_point}` reads @location({location}) \
                 but no vertex buffer provides it"
            ),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A parsed and validated WGSL module.
pub struct WgslShader<'a> {
    label: String,
    source: &'a str,
    module: naga::Module,
}

impl<'a> WgslShader<'a> {
    /// Parses and validates `source`.
    pub fn parse(label: impl Into<String>, source: &'a str) -> Result<Self, ShaderError> {
        let label = label.into();

        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
            label: label.clone(),
            diagnostic: e.emit_to_string(source),
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|e| ShaderError::Validation {
                label: label.clone(),
                diagnostic: e.emit_to_string(source),
            })?;

        Ok(Self {
            label,
            source,
            module,
        })
    }

    /// Fails unless the module defines `name` as an entry point for `stage`.
    pub fn require_entry_point(&self, name: &str, stage: ShaderStage) -> Result<(), ShaderError> {
        if self.entry_point(name, stage).is_some() {
            return Ok(());
        }
        Err(ShaderError::MissingEntryPoint {
            label: self.label.clone(),
            name: name.to_string(),
            stage,
        })
    }

    /// Fails if the vertex entry point reads a location not listed in `provided`.
    ///
    /// `provided` holds the `shader_location`s of every attribute across the
    /// pipeline's vertex buffer layouts.
    pub fn check_vertex_inputs(&self, entry_point: &str, provided: &[u32]) -> Result<(), ShaderError> {
        self.require_entry_point(entry_point, ShaderStage::Vertex)?;

        for location in self.vertex_input_locations(entry_point) {
            if !provided.contains(&location) {
                return Err(ShaderError::UnboundVertexInput {
                    label: self.label.clone(),
                    entry_point: entry_point.to_string(),
                    location,
                });
            }
        }
        Ok(())
    }

    /// Hands the source to the device.
    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(self.source.into()),
        })
    }

    fn entry_point(&self, name: &str, stage: ShaderStage) -> Option<&naga::EntryPoint> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == name && ep.stage == stage)
    }

    /// `@location` inputs of a vertex entry point, including struct members.
    fn vertex_input_locations(&self, entry_point: &str) -> Vec<u32> {
        let Some(ep) = self.entry_point(entry_point, ShaderStage::Vertex) else {
            return Vec::new();
        };

        let mut locations = Vec::new();
        for arg in &ep.function.arguments {
            match &arg.binding {
                Some(Binding::Location { location, .. }) => locations.push(*location),
                Some(_) => {}
                None => {
                    if let TypeInner::Struct { members, .. } = &self.module.types[arg.ty].inner {
                        for member in members {
                            if let Some(Binding::Location { location, .. }) = &member.binding {
                                locations.push(*location);
                            }
                        }
                    }
                }
            }
        }
        locations
    }
}
