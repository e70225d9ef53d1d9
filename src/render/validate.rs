//! WGSL compile and link checks shared by both devices.
//!
//! Compiling a stage parses and validates the module with naga and records
//! its entry point interface. Linking checks that exactly one vertex and one
//! fragment stage are present and that every fragment input location is
//! written by the vertex stage.

use std::collections::BTreeSet;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, EntryPoint, Module, TypeInner};

use super::ShaderStage;

/// Entry point and inter-stage locations of one compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: BTreeSet<u32>,
    pub outputs: BTreeSet<u32>,
}

/// Indices of the vertex and fragment stage in a successfully linked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedStages {
    pub vertex: usize,
    pub fragment: usize,
}

pub fn compile_wgsl(source: &str, stage: ShaderStage) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))?;
    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| err.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.stage == wanted)
        .ok_or_else(|| format!("module has no @{} entry point", stage.name()))?;

    Ok(StageInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs: input_locations(&module, entry),
        outputs: output_locations(&module, entry),
    })
}

pub fn check_link(stages: &[&StageInterface]) -> Result<LinkedStages, String> {
    let vertex = single_stage(stages, ShaderStage::Vertex)?;
    let fragment = single_stage(stages, ShaderStage::Fragment)?;

    let written = &stages[vertex].outputs;
    if let Some(missing) = stages[fragment]
        .inputs
        .iter()
        .find(|location| !written.contains(location))
    {
        return Err(format!(
            "fragment input @location({missing}) is not written by the vertex stage"
        ));
    }
    Ok(LinkedStages { vertex, fragment })
}

fn single_stage(stages: &[&StageInterface], stage: ShaderStage) -> Result<usize, String> {
    let mut found = stages
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.stage == stage)
        .map(|(index, _)| index);
    let first = found
        .next()
        .ok_or_else(|| format!("no {} stage attached", stage.name()))?;
    if found.next().is_some() {
        return Err(format!("more than one {} stage attached", stage.name()));
    }
    Ok(first)
}

fn input_locations(module: &Module, entry: &EntryPoint) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    for argument in &entry.function.arguments {
        collect_locations(module, argument.ty, argument.binding.as_ref(), &mut locations);
    }
    locations
}

fn output_locations(module: &Module, entry: &EntryPoint) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    if let Some(result) = &entry.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut locations);
    }
    locations
}

fn collect_locations(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    locations: &mut BTreeSet<u32>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            locations.insert(*location);
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), locations);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shaders;

    #[test]
    fn builtin_stages_compile() {
        for (source, stage) in [
            (shaders::AXIS_VERTEX, ShaderStage::Vertex),
            (shaders::AXIS_FRAGMENT, ShaderStage::Fragment),
            (shaders::CUBE_VERTEX, ShaderStage::Vertex),
            (shaders::CUBE_FRAGMENT, ShaderStage::Fragment),
            (shaders::LIT_MESH_VERTEX, ShaderStage::Vertex),
            (shaders::LIT_MESH_FRAGMENT, ShaderStage::Fragment),
            (shaders::TRIANGLE_VERTEX, ShaderStage::Vertex),
            (shaders::TRIANGLE_FRAGMENT, ShaderStage::Fragment),
        ] {
            if let Err(log) = compile_wgsl(source, stage) {
                panic!("{} stage failed to compile:\n{log}", stage.name());
            }
        }
    }

    #[test]
    fn reflects_inter_stage_locations() {
        let vertex = compile_wgsl(shaders::LIT_MESH_VERTEX, ShaderStage::Vertex).unwrap();
        assert_eq!(vertex.entry_point, "vs_main");
        assert_eq!(vertex.inputs, BTreeSet::from([0, 1, 2]));
        assert_eq!(vertex.outputs, BTreeSet::from([0, 1, 2]));

        let fragment = compile_wgsl(shaders::LIT_MESH_FRAGMENT, ShaderStage::Fragment).unwrap();
        assert_eq!(fragment.entry_point, "fs_main");
        assert_eq!(fragment.outputs, BTreeSet::from([0]));
    }

    #[test]
    fn syntax_errors_produce_a_log() {
        let log = compile_wgsl("fn broken( {", ShaderStage::Vertex).unwrap_err();
        assert!(!log.is_empty());
    }

    #[test]
    fn wrong_stage_is_rejected() {
        let err = compile_wgsl(shaders::AXIS_FRAGMENT, ShaderStage::Vertex).unwrap_err();
        assert!(err.contains("no @vertex entry point"));
    }

    #[test]
    fn link_requires_both_stages() {
        let vertex = compile_wgsl(shaders::AXIS_VERTEX, ShaderStage::Vertex).unwrap();
        let err = check_link(&[&vertex]).unwrap_err();
        assert_eq!(err, "no fragment stage attached");
    }

    #[test]
    fn link_rejects_unwritten_fragment_inputs() {
        let vertex = compile_wgsl(shaders::AXIS_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = compile_wgsl(shaders::LIT_MESH_FRAGMENT, ShaderStage::Fragment).unwrap();
        let err = check_link(&[&vertex, &fragment]).unwrap_err();
        assert!(err.contains("@location(1)"), "{err}");
    }

    #[test]
    fn link_finds_stage_indices() {
        let vertex = compile_wgsl(shaders::CUBE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = compile_wgsl(shaders::CUBE_FRAGMENT, ShaderStage::Fragment).unwrap();
        let linked = check_link(&[&fragment, &vertex]).unwrap();
        assert_eq!(linked, LinkedStages { vertex: 1, fragment: 0 });
    }
}
