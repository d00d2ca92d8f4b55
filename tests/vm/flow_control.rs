//! Flow control integration tests
//!
//! Jump arithmetic, subroutine calls, dynamic calls, and the terminal
//! state machine, exercised through complete programs.

use num_bigint::BigInt;
use obol::foundation::ErrorKind;
use obol::vm::{Engine, EngineConfig, OpCode, ScriptBuilder, VmState};

fn run(code: Vec<u8>) -> Engine {
    let mut engine = Engine::new(code);
    let _ = engine.run();
    engine
}

fn top_int(engine: &Engine) -> BigInt {
    engine
        .evaluation_stack()
        .peek(0)
        .expect("result on the stack")
        .as_bigint()
        .expect("integer result")
}

// =============================================================================
// Jump Arithmetic
// =============================================================================

#[test]
fn forward_jump_skips_the_untaken_branch() {
    // if (1) { push 10 } else { push 12 }
    let mut b = ScriptBuilder::new();
    b.emit_push_int(1); // 0
    b.emit_jump(OpCode::JmpIf, 5); // 1: to 6
    b.emit_push_int(12); // 4: untaken branch
    b.emit(OpCode::Ret); // 5
    b.emit_push_int(10); // 6: taken branch
    b.emit(OpCode::Ret); // 7

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
    assert_eq!(top_int(&engine), BigInt::from(10));
}

#[test]
fn loop_sums_one_through_five() {
    // total on the alt stack, counter on the evaluation stack
    let mut b = ScriptBuilder::new();
    b.emit_push_int(0);
    b.emit(OpCode::ToAltStack); // total = 0
    b.emit_push_int(5); // counter
    // loop body at offset 3:
    b.emit(OpCode::Dup); // 3: counter counter
    b.emit(OpCode::FromAltStack); // counter counter total
    b.emit(OpCode::Add); // counter total'
    b.emit(OpCode::ToAltStack); // counter
    b.emit(OpCode::Dec); // counter-1
    b.emit(OpCode::Dup);
    b.emit_jump(OpCode::JmpIf, -6); // 9: back to 3
    b.emit(OpCode::Drop);
    b.emit(OpCode::FromAltStack);

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
    assert_eq!(top_int(&engine), BigInt::from(15));
}

#[test]
fn jump_exactly_to_the_end_is_a_clean_halt() {
    let mut b = ScriptBuilder::new();
    b.emit_push_int(1);
    b.emit_jump(OpCode::Jmp, 3); // from 1 to 4 == len

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
}

#[test]
fn jump_one_past_the_end_faults() {
    let mut b = ScriptBuilder::new();
    b.emit_jump(OpCode::Jmp, 4); // from 0 to 4, len is 3

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Faulted);
    assert_eq!(
        engine.fault().unwrap().kind,
        ErrorKind::InvalidJumpTarget(4)
    );
}

// =============================================================================
// Subroutines
// =============================================================================

#[test]
fn subroutine_reads_arguments_and_leaves_results() {
    // main: push 3, push 4, call double_sum, halt
    // double_sum: ADD, DUP, ADD, RET
    let mut b = ScriptBuilder::new();
    b.emit_push_int(3); // 0
    b.emit_push_int(4); // 1
    b.emit_jump(OpCode::Call, 4); // 2: to 6
    b.emit(OpCode::Ret); // 5
    b.emit(OpCode::Add); // 6
    b.emit(OpCode::Dup); // 7
    b.emit(OpCode::Add); // 8
    b.emit(OpCode::Ret); // 9

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
    assert_eq!(engine.evaluation_stack().len(), 1);
    assert_eq!(top_int(&engine), BigInt::from(14));
}

#[test]
fn nested_calls_unwind_in_order() {
    // main calls outer, outer calls inner; each level pushes a marker
    // after its callee returns, so the final order proves the unwind.
    let mut b = ScriptBuilder::new();
    b.emit_jump(OpCode::Call, 5); // 0: to outer at 5
    b.emit_push_int(3); // 3: main marker
    b.emit(OpCode::Ret); // 4
    b.emit_jump(OpCode::Call, 5); // 5: to inner at 10
    b.emit_push_int(2); // 8: outer marker
    b.emit(OpCode::Ret); // 9
    b.emit_push_int(1); // 10: inner marker
    b.emit(OpCode::Ret); // 11

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
    let order: Vec<BigInt> = engine
        .evaluation_stack()
        .items()
        .iter()
        .map(|item| item.as_bigint().unwrap())
        .collect();
    assert_eq!(
        order,
        vec![BigInt::from(1), BigInt::from(2), BigInt::from(3)]
    );
}

#[test]
fn recursion_is_bounded_by_the_depth_limit() {
    let mut b = ScriptBuilder::new();
    b.emit_jump(OpCode::Call, 0); // calls itself forever

    let mut engine = Engine::with_config(b.finish(), EngineConfig { max_call_depth: 16 });
    assert!(engine.run().is_err());
    assert_eq!(
        engine.fault().unwrap().kind,
        ErrorKind::CallDepthExceeded(16)
    );
}

// =============================================================================
// Dynamic Calls
// =============================================================================

#[test]
fn dyncall_dispatches_through_a_computed_target() {
    // Pick a handler address off the stack: 1 + 6 = handler at 7.
    let mut b = ScriptBuilder::new();
    b.emit_push_int(1); // 0
    b.emit_push_int(6); // 1
    b.emit(OpCode::Add); // 2: target = 7
    b.emit(OpCode::DynCall); // 3
    b.emit_push_int(5); // 4: after return
    b.emit(OpCode::Ret); // 5
    b.emit(OpCode::Nop); // 6
    b.emit_push_int(9); // 7: handler
    b.emit(OpCode::Ret); // 8

    let engine = run(b.finish());
    assert_eq!(engine.state(), VmState::Halted);
    let items: Vec<BigInt> = engine
        .evaluation_stack()
        .items()
        .iter()
        .map(|item| item.as_bigint().unwrap())
        .collect();
    assert_eq!(items, vec![BigInt::from(9), BigInt::from(5)]);
}

#[test]
fn dyncall_boundary_is_stricter_than_jmp() {
    // JMP may land at len; DCALL to len faults.
    let mut jmp = ScriptBuilder::new();
    jmp.emit_jump(OpCode::Jmp, 3); // to 3 == len
    assert_eq!(run(jmp.finish()).state(), VmState::Halted);

    let mut dcall = ScriptBuilder::new();
    dcall.emit_push_int(2); // 0
    dcall.emit(OpCode::DynCall); // 1; len == 2
    let engine = run(dcall.finish());
    assert_eq!(engine.state(), VmState::Faulted);
    assert_eq!(
        engine.fault().unwrap().kind,
        ErrorKind::InvalidCallTarget(2)
    );
}
