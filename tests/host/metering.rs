//! Metering integration tests
//!
//! The host meters driving real engine executions to their budget edges.

use obol::foundation::ErrorKind;
use obol::host::{GasMeter, StepMeter};
use obol::vm::{Engine, Meter, OpCode, ScriptBuilder, VmState};

fn nop_field(len: usize) -> Vec<u8> {
    vec![OpCode::Nop.byte(); len]
}

#[test]
fn a_sufficient_gas_budget_lets_the_program_halt() {
    // 10 NOPs plus the implicit final RET; RET ends the run before
    // the meter is consulted, so 10 units suffice.
    let mut engine = Engine::new(nop_field(10)).with_meter(Box::new(GasMeter::new(10)));
    assert_eq!(engine.run().unwrap(), VmState::Halted);
}

#[test]
fn an_insufficient_gas_budget_faults() {
    let mut engine = Engine::new(nop_field(10)).with_meter(Box::new(GasMeter::new(9)));
    assert!(engine.run().is_err());
    assert_eq!(engine.state(), VmState::Faulted);
    assert_eq!(engine.fault().unwrap().kind, ErrorKind::GasExhausted);
}

#[test]
fn the_abort_point_is_deterministic() {
    // Two identical engines with the same budget fault at the same step.
    let steps = |budget: u64| {
        let mut engine =
            Engine::new(nop_field(50)).with_meter(Box::new(StepMeter::new(budget)));
        let _ = engine.run();
        engine.steps()
    };
    assert_eq!(steps(7), steps(7));
    assert_eq!(steps(7), 8);
}

#[test]
fn step_meter_counts_jump_iterations() {
    // countdown loop: PUSH8, then 3 opcodes per iteration
    let mut b = ScriptBuilder::new();
    b.emit_push_int(8);
    b.emit(OpCode::Dec).emit(OpCode::Dup);
    b.emit_jump(OpCode::JmpIf, -2);

    let mut bounded = Engine::new(b.finish()).with_meter(Box::new(StepMeter::new(10)));
    assert!(bounded.run().is_err());
    assert_eq!(bounded.fault().unwrap().kind, ErrorKind::StepLimitExceeded);
}

#[test]
fn meters_compose_with_direct_use() {
    let mut gas = GasMeter::new(5);
    let mut steps = StepMeter::new(100);
    for _ in 0..5 {
        gas.charge_gas(1).unwrap();
        steps.count_step().unwrap();
    }
    assert_eq!(gas.remaining(), 0);
    assert_eq!(steps.remaining(), 95);
    assert!(gas.charge_gas(1).is_err());
}
