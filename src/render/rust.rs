//! Rust backend
//!
//! Emits a `match`-based routine over a slice of instructions, meant to be
//! pulled into the engine with `include!`. The engine supplies the
//! instruction type (with `opcode()` and `operands()`), the status enum,
//! the `iter_<arity>` operand iterators (returning `()`, like the C++
//! ones) and the opcode-to-text function.
//!
//! Rust patterns cannot hold arithmetic, so keys are always literal here.

use super::{Backend, IndentWriter, RenderOptions, Target};
use crate::emit::{DispatchArm, DispatchTable, HandlerSignature};

pub struct RustBackend<'a> {
    options: &'a RenderOptions,
}

impl<'a> RustBackend<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    fn unsupported(&self) -> String {
        format!(
            "return {}({}(opcode))",
            self.options.unsupported_status, self.options.opcode_text_fn
        )
    }
}

impl Backend for RustBackend<'_> {
    fn target(&self) -> Target {
        Target::Rust
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn emit_header(&self, w: &mut IndentWriter, catalog: &str) {
        w.line(&format!(
            "// @generated by ve-gen from catalog '{}'. Do not edit.",
            catalog
        ));
    }

    fn emit_stub(&self, w: &mut IndentWriter, stub: &HandlerSignature) {
        let o = self.options;
        let mut params = vec![format!("instr: &{}", o.instruction_type)];
        for (i, op) in stub.operands.iter().enumerate() {
            // The first operand is the output.
            let reference = if i == 0 { "&mut T" } else { "&T" };
            params.push(format!("{}: {}", op, reference));
        }
        let mut bound = vec!["instr".to_string()];
        bound.extend(stub.operands.iter().cloned());

        let signature = format!(
            "pub fn {}<T>({}) -> {} {{",
            stub.name,
            params.join(", "),
            o.status_type
        );
        w.block(&signature, Some("}"), |w| {
            w.line(&format!("let _ = ({});", bound.join(", ")));
            w.line("// kernel body goes here");
            w.line(&o.success_status);
        });
    }

    fn emit_arm(&self, w: &mut IndentWriter, arm: &DispatchArm, _base: u32) {
        let call = format!(
            "{} => {}{}::<{}>(instr, {}),",
            arm.key, self.options.iterate_prefix, arm.arity, arm.token, arm.handler
        );
        if self.options.emit_comments {
            w.line(&format!("{} // {} x {}", call, arm.opcode, arm.element));
        } else {
            w.line(&call);
        }
    }

    fn emit_routine(&self, w: &mut IndentWriter, table: &DispatchTable) {
        let o = self.options;
        let signature = format!(
            "pub fn {}(instructions: &[{}]) -> {} {{",
            o.routine_name, o.instruction_type, o.status_type
        );

        w.block(&signature, Some("}"), |w| {
            w.block("for instr in instructions {", Some("}"), |w| {
                w.line("let opcode = instr.opcode();");

                if !table.controls.is_empty() {
                    let ordinals: Vec<String> = table
                        .controls
                        .iter()
                        .map(|c| c.ordinal.to_string())
                        .collect();
                    if o.emit_comments {
                        let names: Vec<&str> =
                            table.controls.iter().map(|c| c.name.as_str()).collect();
                        w.line(&format!("// {}", names.join(", ")));
                    }
                    let test = format!("if matches!(opcode, {}) {{", ordinals.join(" | "));
                    w.block(&test, Some("}"), |w| w.line("continue;"));
                }

                w.block(
                    "let element = match instr.operands().first() {",
                    Some("};"),
                    |w| {
                        w.line("Some(operand) => operand.type_ordinal(),");
                        w.line(&format!("None => {},", self.unsupported()));
                    },
                );
                w.line(&format!(
                    "let key = u64::from(opcode) * {} + u64::from(element);",
                    table.base
                ));
                w.block("match key {", Some("}"), |w| {
                    for arm in &table.arms {
                        self.emit_arm(w, arm, table.base);
                    }
                    w.line(&format!("_ => {},", self.unsupported()));
                });
            });
            w.line(&o.success_status);
        });
    }
}
