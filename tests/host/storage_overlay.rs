//! Storage and overlay integration tests

use obol::foundation::ErrorKind;
use obol::host::{CallBridge, CallTarget, MemoryStorage, OverlayCache, Storage, VmKind};

#[test]
fn overlay_stacks_a_transaction_over_populated_storage() {
    let mut storage = MemoryStorage::new();
    storage.put(b"acct/alice", b"100").unwrap();
    storage.put(b"acct/bob", b"50").unwrap();

    let mut overlay = OverlayCache::new(&mut storage);
    overlay.put(b"acct/alice", b"70");
    overlay.put(b"acct/bob", b"80");

    assert_eq!(overlay.get(b"acct/alice").unwrap(), Some(b"70".to_vec()));
    overlay.commit().unwrap();

    let accounts = storage.scan_prefix(b"acct/").unwrap();
    assert_eq!(
        accounts,
        vec![
            (b"acct/alice".to_vec(), b"70".to_vec()),
            (b"acct/bob".to_vec(), b"80".to_vec()),
        ]
    );
}

#[test]
fn an_abandoned_overlay_leaves_storage_untouched() {
    let mut storage = MemoryStorage::new();
    storage.put(b"balance", b"100").unwrap();
    {
        let mut overlay = OverlayCache::new(&mut storage);
        overlay.put(b"balance", b"0");
        overlay.delete(b"balance");
        // dropped without commit
    }
    assert_eq!(storage.get(b"balance").unwrap(), Some(b"100".to_vec()));
}

#[test]
fn deletions_commit_alongside_puts() {
    let mut storage = MemoryStorage::new();
    storage.put(b"old", b"1").unwrap();

    let mut overlay = OverlayCache::new(&mut storage);
    overlay.delete(b"old");
    overlay.put(b"new", b"2");
    overlay.commit().unwrap();

    assert_eq!(storage.get(b"old").unwrap(), None);
    assert_eq!(storage.get(b"new").unwrap(), Some(b"2".to_vec()));
}

// =============================================================================
// Call Bridge
// =============================================================================

/// Bridge that records invocations and answers from storage.
struct RecordingBridge {
    storage: MemoryStorage,
    invocations: Vec<CallTarget>,
}

impl CallBridge for RecordingBridge {
    fn resolve(&self, address: &[u8]) -> obol::foundation::Result<VmKind> {
        match self.storage.get(address)? {
            Some(_) => Ok(VmKind::Bytecode),
            None => Err(obol::host::unknown_contract(address)),
        }
    }

    fn invoke(&mut self, target: &CallTarget) -> obol::foundation::Result<Vec<u8>> {
        self.resolve(&target.address)?;
        self.invocations.push(target.clone());
        self.storage.get(&target.address).map(Option::unwrap_or_default)
    }
}

#[test]
fn bridge_resolves_contracts_registered_in_storage() {
    let mut storage = MemoryStorage::new();
    storage.put(b"contract-a", b"code").unwrap();
    let mut bridge = RecordingBridge {
        storage,
        invocations: Vec::new(),
    };

    assert_eq!(bridge.resolve(b"contract-a").unwrap(), VmKind::Bytecode);

    let target = CallTarget::new(b"contract-a".to_vec(), "init").with_arg(vec![1]);
    assert_eq!(bridge.invoke(&target).unwrap(), b"code".to_vec());
    assert_eq!(bridge.invocations.len(), 1);
    assert_eq!(bridge.invocations[0].method, "init");
}

#[test]
fn bridge_faults_on_unregistered_addresses() {
    let mut bridge = RecordingBridge {
        storage: MemoryStorage::new(),
        invocations: Vec::new(),
    };
    let target = CallTarget::new(b"nowhere".to_vec(), "init");
    let err = bridge.invoke(&target).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::HostCallFailed(_)));
    assert!(bridge.invocations.is_empty());
}
