//! C++ backend
//!
//! Emits a `switch`-based routine over the engine's instruction array and
//! one function template per handler:
//!
//! ```text
//! case 1203: // VE_ADD x VE_INT32
//!     iter_3<ve_int32>(instr, &ve_add);
//!     break;
//! ```

use super::{Backend, IndentWriter, KeyStyle, RenderOptions, Target};
use crate::emit::{DispatchArm, DispatchTable, HandlerSignature};

pub struct CppBackend<'a> {
    options: &'a RenderOptions,
}

impl<'a> CppBackend<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    fn case_label(&self, arm: &DispatchArm, base: u32) -> String {
        match self.options.key_style {
            KeyStyle::Symbolic => format!("case {}*{}+{}:", arm.opcode, base, arm.element),
            KeyStyle::Literal if self.options.emit_comments => {
                format!("case {}: // {} x {}", arm.key, arm.opcode, arm.element)
            }
            KeyStyle::Literal => format!("case {}:", arm.key),
        }
    }

    fn control_label(&self, name: &str, ordinal: u32) -> String {
        match self.options.key_style {
            KeyStyle::Symbolic => format!("case {}:", name),
            KeyStyle::Literal if self.options.emit_comments => {
                format!("case {}: // {}", ordinal, name)
            }
            KeyStyle::Literal => format!("case {}:", ordinal),
        }
    }
}

impl Backend for CppBackend<'_> {
    fn target(&self) -> Target {
        Target::Cpp
    }

    fn file_extension(&self) -> &'static str {
        "cpp"
    }

    fn emit_header(&self, w: &mut IndentWriter, catalog: &str) {
        w.line(&format!(
            "// Generated by ve-gen from catalog '{}'. Do not edit.",
            catalog
        ));
    }

    fn emit_stub(&self, w: &mut IndentWriter, stub: &HandlerSignature) {
        let o = self.options;
        let mut params = vec![format!("{} *instr", o.instruction_type)];
        params.extend(stub.operands.iter().map(|op| format!("T *{}", op)));

        w.line("template <typename T>");
        w.block(
            &format!("{} {}({}) {{", o.status_type, stub.name, params.join(", ")),
            Some("}"),
            |w| {
                w.line("// kernel body goes here");
                w.line(&format!("return {};", o.success_status));
            },
        );
    }

    fn emit_arm(&self, w: &mut IndentWriter, arm: &DispatchArm, base: u32) {
        w.block(&self.case_label(arm, base), None, |w| {
            w.line(&format!(
                "{}{}<{}>(instr, &{});",
                self.options.iterate_prefix, arm.arity, arm.token, arm.handler
            ));
            w.line("break;");
        });
    }

    fn emit_routine(&self, w: &mut IndentWriter, table: &DispatchTable) {
        let o = self.options;
        let signature = format!(
            "{} {}({} instruction_count, {} instruction_list[]) {{",
            o.status_type, o.routine_name, o.index_type, o.instruction_type
        );
        let each = format!("for ({} i = 0; i < instruction_count; ++i) {{", o.index_type);

        w.block(&signature, Some("}"), |w| {
            w.block(&each, Some("}"), |w| {
                w.line(&format!("{} *instr = &instruction_list[i];", o.instruction_type));
                w.block("switch (instr->opcode) {", Some("}"), |w| {
                    if !table.controls.is_empty() {
                        for control in &table.controls {
                            w.line(&self.control_label(&control.name, control.ordinal));
                        }
                        w.indent();
                        w.line("break;");
                        w.dedent();
                        w.blank();
                    }
                    w.block("default: {", Some("}"), |w| {
                        // Keys are 64-bit; plain `long` is 32 bits on LLP64 targets.
                        w.line(&format!(
                            "const long long key = (long long)instr->opcode * {} + instr->operand[0]->type;",
                            table.base
                        ));
                        w.block("switch (key) {", Some("}"), |w| {
                            for arm in &table.arms {
                                self.emit_arm(w, arm, table.base);
                            }
                            w.blank();
                            w.block("default:", None, |w| {
                                w.block("fprintf(", Some(");"), |w| {
                                    w.line("stderr,");
                                    w.line(&format!(
                                        "\"{}() encountered an unsupported instruction: %s\\n\",",
                                        o.routine_name
                                    ));
                                    w.line(&format!("{}(instr->opcode)", o.opcode_text_fn));
                                });
                                w.line(&format!("return {};", o.unsupported_status));
                            });
                        });
                        w.line("break;");
                    });
                });
            });
            w.line(&format!("return {};", o.success_status));
        });
    }
}
