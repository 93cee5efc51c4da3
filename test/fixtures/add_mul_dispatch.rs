// @generated by ve-gen from catalog 'add-mul'. Do not edit.

pub fn add<T>(instr: &Instruction, op1: &mut T, op2: &T) -> Status {
    let _ = (instr, op1, op2);
    // kernel body goes here
    Status::Success
}

pub fn mul<T>(instr: &Instruction, op1: &mut T, op2: &T) -> Status {
    let _ = (instr, op1, op2);
    // kernel body goes here
    Status::Success
}

pub fn execute(instructions: &[Instruction]) -> Status {
    for instr in instructions {
        let opcode = instr.opcode();
        // SYNC
        if matches!(opcode, 0) {
            continue;
        }
        let element = match instr.operands().first() {
            Some(operand) => operand.type_ordinal(),
            None => return Status::UnsupportedInstruction(opcode_text(opcode)),
        };
        let key = u64::from(opcode) * 100 + u64::from(element);
        match key {
            100 => iter_2::<i32>(instr, add), // ADD x INT32
            101 => iter_2::<f64>(instr, add), // ADD x FLOAT64
            200 => iter_2::<i32>(instr, mul), // MUL x INT32
            201 => iter_2::<f64>(instr, mul), // MUL x FLOAT64
            _ => return Status::UnsupportedInstruction(opcode_text(opcode)),
        }
    }
    Status::Success
}
