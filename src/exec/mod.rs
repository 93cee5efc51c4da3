//! In-process dispatcher
//!
//! Routes instructions through a [`DispatchTable`] exactly as the generated
//! routine does, calling into a [`Kernels`] implementation instead of
//! compiled handlers. Engines that run kernels in Rust can use it directly;
//! it also lets the routing logic be exercised without compiling the
//! generated source.

use crate::catalog::{Catalog, ElementType};
use crate::emit::{emit_stubs, DispatchTable, HandlerSignature};
use crate::error::{ConfigError, ConfigResult};
use crate::key::{DispatchKey, KeyScheme};
use log::{debug, trace};
use std::collections::HashMap;

/// Outcome of running a batch of instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStatus {
    /// Every instruction was dispatched
    Success,
    /// No handler for this opcode and operand type; the batch stopped here
    UnsupportedInstruction(String),
}

impl ExecStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecStatus::Success)
    }
}

/// Operand reference whose element type is known at runtime
pub trait TypedOperand {
    fn type_ordinal(&self) -> u32;
}

/// Instruction as the engine presents it to the dispatcher
pub trait Instruction {
    type Operand: TypedOperand;

    fn opcode(&self) -> u32;

    fn operands(&self) -> &[Self::Operand];
}

/// Numeric kernels behind the handlers
pub trait Kernels<I: Instruction> {
    /// Run `handler` specialized for `element` over the instruction's operands
    fn invoke(&mut self, handler: &HandlerSignature, element: &ElementType, instr: &I);
}

/// Route entry: handler index and element type for one dispatch key
#[derive(Debug, Clone)]
struct Route {
    handler: usize,
    element: ElementType,
}

/// Table-driven dispatcher built from a catalog
#[derive(Debug, Clone)]
pub struct Dispatcher {
    scheme: KeyScheme,
    controls: Vec<u32>,
    names: HashMap<u32, String>,
    handlers: Vec<HandlerSignature>,
    routes: HashMap<DispatchKey, Route>,
}

impl Dispatcher {
    /// Emit and verify the catalog's table, then index it for lookup
    pub fn new(catalog: &Catalog) -> ConfigResult<Self> {
        let table = crate::emit::emit_dispatch(catalog)?;
        Self::from_parts(catalog, &table, emit_stubs(catalog))
    }

    /// Index an already emitted table.
    ///
    /// The table is verified against the catalog and every arm must name one
    /// of `handlers`, so a mismatched table fails here instead of routing
    /// its keys to `UnsupportedInstruction` at run time.
    pub fn from_parts(
        catalog: &Catalog,
        table: &DispatchTable,
        handlers: Vec<HandlerSignature>,
    ) -> ConfigResult<Self> {
        table.verify(catalog)?;

        let by_name: HashMap<&str, usize> = handlers
            .iter()
            .enumerate()
            .map(|(index, h)| (h.name.as_str(), index))
            .collect();

        let mut routes = HashMap::with_capacity(table.len());
        for arm in table.arms() {
            let handler = *by_name.get(arm.handler.as_str()).ok_or_else(|| {
                ConfigError::UnknownHandler {
                    handler: arm.handler.clone(),
                    opcode: arm.opcode.clone(),
                }
            })?;
            let element = catalog
                .types()
                .get(&arm.element)
                .ok_or_else(|| ConfigError::UnexpectedArm {
                    opcode: arm.opcode.clone(),
                    element: arm.element.clone(),
                })?;
            routes.insert(
                arm.key,
                Route {
                    handler,
                    element: element.clone(),
                },
            );
        }

        let names = catalog
            .opcodes()
            .all()
            .map(|op| (op.ordinal, op.name.clone()))
            .collect();

        debug!(
            "dispatcher for '{}' indexed {} routes",
            catalog.name(),
            routes.len()
        );

        Ok(Self {
            scheme: *catalog.scheme(),
            controls: table.controls.iter().map(|c| c.ordinal).collect(),
            names,
            handlers,
            routes,
        })
    }

    pub fn is_control(&self, opcode: u32) -> bool {
        self.controls.contains(&opcode)
    }

    /// Printable opcode name, falling back to the raw ordinal
    pub fn opcode_text(&self, opcode: u32) -> String {
        self.names
            .get(&opcode)
            .cloned()
            .unwrap_or_else(|| format!("opcode #{}", opcode))
    }

    /// Handler and element type a key routes to
    pub fn route(&self, key: DispatchKey) -> Option<(&HandlerSignature, &ElementType)> {
        self.routes
            .get(&key)
            .map(|route| (&self.handlers[route.handler], &route.element))
    }

    /// Dispatch every instruction in order.
    ///
    /// Control opcodes are skipped without computing a key. The first
    /// instruction with no route (or no operand to take a type from) stops
    /// the batch and is reported by name.
    pub fn execute<I, K>(&self, instructions: &[I], kernels: &mut K) -> ExecStatus
    where
        I: Instruction,
        K: Kernels<I>,
    {
        for instr in instructions {
            let opcode = instr.opcode();
            if self.is_control(opcode) {
                trace!("skipping control opcode {}", self.opcode_text(opcode));
                continue;
            }

            let Some(operand) = instr.operands().first() else {
                return ExecStatus::UnsupportedInstruction(self.opcode_text(opcode));
            };
            let key = self.scheme.derive_raw(opcode, operand.type_ordinal());

            match self.route(key) {
                Some((handler, element)) => {
                    trace!("key {} -> {}<{}>", key, handler.name, element.token);
                    kernels.invoke(handler, element, instr);
                }
                None => return ExecStatus::UnsupportedInstruction(self.opcode_text(opcode)),
            }
        }
        ExecStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Op(u32);

    impl TypedOperand for Op {
        fn type_ordinal(&self) -> u32 {
            self.0
        }
    }

    struct Instr {
        opcode: u32,
        operands: Vec<Op>,
    }

    impl Instruction for Instr {
        type Operand = Op;

        fn opcode(&self) -> u32 {
            self.opcode
        }

        fn operands(&self) -> &[Op] {
            &self.operands
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Kernels<Instr> for Recorder {
        fn invoke(&mut self, handler: &HandlerSignature, element: &ElementType, _: &Instr) {
            self.calls.push(format!("{}<{}>", handler.name, element.token));
        }
    }

    fn dispatcher() -> (Catalog, Dispatcher) {
        let catalog = Catalog::builder()
            .types(["INT32", "FLOAT64", "UNKNOWN"])
            .exclude(["UNKNOWN"])
            .control(["NONE", "SYNC"])
            .group(2, ["ADD", "MUL"])
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&catalog).unwrap();
        (catalog, dispatcher)
    }

    fn instr(opcode: u32, ty: u32) -> Instr {
        Instr {
            opcode,
            operands: vec![Op(ty), Op(ty)],
        }
    }

    #[test]
    fn test_routes_by_opcode_and_type() {
        let (_, dispatcher) = dispatcher();
        let mut kernels = Recorder::default();
        // NONE=0, SYNC=1, ADD=2, MUL=3; INT32=0, FLOAT64=1
        let status = dispatcher.execute(&[instr(2, 0), instr(3, 1)], &mut kernels);
        assert_eq!(status, ExecStatus::Success);
        assert_eq!(kernels.calls, ["add<int32>", "mul<float64>"]);
    }

    #[test]
    fn test_excluded_type_is_unsupported() {
        let (_, dispatcher) = dispatcher();
        let mut kernels = Recorder::default();
        let status = dispatcher.execute(&[instr(2, 0), instr(2, 2), instr(3, 0)], &mut kernels);
        assert_eq!(status, ExecStatus::UnsupportedInstruction("ADD".to_string()));
        // The batch halts at the failing instruction.
        assert_eq!(kernels.calls, ["add<int32>"]);
    }

    #[test]
    fn test_unknown_opcode_reported_by_ordinal() {
        let (_, dispatcher) = dispatcher();
        let status = dispatcher.execute(&[instr(42, 0)], &mut Recorder::default());
        assert_eq!(
            status,
            ExecStatus::UnsupportedInstruction("opcode #42".to_string())
        );
    }

    #[test]
    fn test_missing_operand_is_unsupported() {
        let (_, dispatcher) = dispatcher();
        let bare = Instr {
            opcode: 3,
            operands: Vec::new(),
        };
        let status = dispatcher.execute(&[bare], &mut Recorder::default());
        assert_eq!(status, ExecStatus::UnsupportedInstruction("MUL".to_string()));
    }

    #[test]
    fn test_route_lookup() {
        let (catalog, dispatcher) = dispatcher();
        let mul = catalog.opcodes().get("MUL").unwrap();
        let f64 = catalog.types().get("FLOAT64").unwrap();
        let (handler, element) = dispatcher.route(catalog.derive_key(mul, f64)).unwrap();
        assert_eq!(handler.name, "mul");
        assert_eq!(element.name, "FLOAT64");
    }

    #[test]
    fn test_missing_handler_rejected() {
        let (catalog, _) = dispatcher();
        let table = crate::emit::emit_dispatch(&catalog).unwrap();
        let mut handlers = emit_stubs(&catalog);
        handlers.pop();

        let err = Dispatcher::from_parts(&catalog, &table, handlers).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownHandler { handler, opcode } if handler == "mul" && opcode == "MUL"
        ));
    }

    #[test]
    fn test_table_from_other_catalog_rejected() {
        let (catalog, _) = dispatcher();
        let other = Catalog::builder()
            .types(["INT32", "FLOAT64", "UNKNOWN"])
            .exclude(["UNKNOWN"])
            .control(["NONE", "SYNC"])
            .group(2, ["ADD", "MUL", "SUB"])
            .build()
            .unwrap();
        let table = crate::emit::emit_dispatch(&other).unwrap();

        let err = Dispatcher::from_parts(&catalog, &table, emit_stubs(&other)).unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedArm { opcode, .. } if opcode == "SUB"));
    }
}
