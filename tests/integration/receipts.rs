//! Receipt and session integration tests

use num_bigint::BigInt;
use obol::foundation::ErrorKind;
use obol::host::{MemoryStorage, Storage};
use obol::runtime::{Executor, Session};
use obol::vm::{OpCode, ScriptBuilder, VmState};

/// sum(1..=n) via a countdown loop and the alt stack (helper function).
fn sum_script(n: i64) -> Vec<u8> {
    let mut b = ScriptBuilder::new();
    b.emit_push_int(0);
    b.emit(OpCode::ToAltStack);
    b.emit_push_int(n);
    b.emit(OpCode::Dup); // loop head
    b.emit(OpCode::FromAltStack);
    b.emit(OpCode::Add);
    b.emit(OpCode::ToAltStack);
    b.emit(OpCode::Dec);
    b.emit(OpCode::Dup);
    b.emit_jump(OpCode::JmpIf, -6); // back to the loop head
    b.emit(OpCode::Drop);
    b.emit(OpCode::FromAltStack);
    b.emit(OpCode::Ret);
    b.finish()
}

// =============================================================================
// Receipts
// =============================================================================

#[test]
fn a_full_program_produces_a_result_receipt() {
    let receipt = Executor::new().execute(sum_script(10));
    assert!(receipt.succeeded());
    assert_eq!(receipt.stack.len(), 1);
    assert_eq!(
        receipt.top().unwrap().as_bigint().unwrap(),
        BigInt::from(55)
    );
}

#[test]
fn receipts_capture_faults_with_their_position() {
    let mut b = ScriptBuilder::new();
    b.emit_push_int(1);
    b.emit(OpCode::Add); // second operand missing

    let receipt = Executor::new().execute(b.finish());
    assert_eq!(receipt.state, VmState::Faulted);
    let fault = receipt.fault.unwrap();
    assert_eq!(fault.kind, ErrorKind::StackUnderflow);
    assert_eq!(fault.context.unwrap().ip, 1);
}

#[test]
fn step_counts_reflect_the_whole_run() {
    // 3 opcodes of setup, 7 per loop iteration, 3 of teardown
    let receipt = Executor::new().execute(sum_script(3));
    assert!(receipt.succeeded());
    assert_eq!(receipt.steps, 3 + 7 * 3 + 3);
}

#[test]
fn budgets_apply_per_invocation_not_per_executor() {
    let executor = Executor::new().with_step_limit(100);
    // Each invocation gets a fresh budget, so a second run of the same
    // program cannot be starved by the first.
    let first = executor.execute(sum_script(10));
    let second = executor.execute(sum_script(10));
    assert!(first.succeeded());
    assert!(second.succeeded());
}

#[test]
fn an_exhausted_budget_is_a_receipt_not_a_panic() {
    let receipt = Executor::new()
        .with_gas_limit(10)
        .execute(sum_script(1000));
    assert_eq!(receipt.state, VmState::Faulted);
    assert_eq!(receipt.fault.unwrap().kind, ErrorKind::GasExhausted);
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn a_session_persists_results_of_successful_invocations() {
    let mut session = Session::new(Executor::new(), MemoryStorage::new());
    let receipt = session
        .execute_staged(sum_script(10), |overlay| {
            overlay.put(b"sum/10", b"55");
        })
        .unwrap();

    assert!(receipt.succeeded());
    assert_eq!(
        session.storage().get(b"sum/10").unwrap(),
        Some(b"55".to_vec())
    );
}

#[test]
fn a_session_rolls_back_failed_invocations() {
    let mut faulting = ScriptBuilder::new();
    faulting.emit(OpCode::Drop);

    let mut session = Session::new(Executor::new(), MemoryStorage::new());
    session
        .execute_staged(sum_script(10), |overlay| {
            overlay.put(b"epoch", b"1");
        })
        .unwrap();
    let receipt = session
        .execute_staged(faulting.finish(), |overlay| {
            overlay.put(b"epoch", b"2");
            overlay.put(b"junk", b"x");
        })
        .unwrap();

    assert!(!receipt.succeeded());
    let storage = session.into_storage();
    assert_eq!(storage.get(b"epoch").unwrap(), Some(b"1".to_vec()));
    assert_eq!(storage.get(b"junk").unwrap(), None);
}

#[test]
fn sequential_invocations_observe_committed_state() {
    let mut session = Session::new(Executor::new(), MemoryStorage::new());
    for epoch in 1..=3u8 {
        session
            .execute_staged(sum_script(2), |overlay| {
                overlay.put(b"epoch", &[epoch]);
            })
            .unwrap();
    }
    assert_eq!(session.storage().get(b"epoch").unwrap(), Some(vec![3]));
}
