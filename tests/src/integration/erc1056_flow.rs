//! # Registry Operation Flows
//!
//! Every operation exercised twice: by direct call from the controller and
//! by an offline signature relayed by an unrelated account. Each flow also
//! checks the refusals: the previous controller, an attacker, a signature
//! from the wrong key and a signature over the wrong nonce.
//!
//! Direct-call actors:
//!
//! | name | account |
//! |------|---------|
//! | identity | `account(0)` |
//! | identity2 | `account(1)` |
//! | delegate | `account(2)` |
//! | delegate2 | `account(3)` |
//! | delegate3 | `account(4)` |
//! | bad_boy | `account(5)` |
//!
//! Signed flows use the two well-known keys: `signer` controls itself until it
//! hands control to `signer2`.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use idr_registry::{
        Claim, IdentityRegistryApi, Operation, Receipt, RegistryError, RegistryEvent,
    };
    use idr_types::Address;

    fn identity() -> Address {
        account(0)
    }
    fn identity2() -> Address {
        account(1)
    }
    fn delegate() -> Address {
        account(2)
    }
    fn delegate2() -> Address {
        account(3)
    }
    fn delegate3() -> Address {
        account(4)
    }
    fn bad_boy() -> Address {
        account(5)
    }

    fn assert_bad_actor(result: Result<Receipt, RegistryError>) {
        let err = result.expect_err("operation should be refused");
        assert!(err.is_bad_actor(), "expected bad_actor, got {err}");
    }

    fn assert_bad_signature(result: Result<Receipt, RegistryError>) {
        let err = result.expect_err("operation should be refused");
        assert!(err.is_bad_signature(), "expected bad_signature, got {err}");
    }

    // =========================================================================
    // STAGES
    // =========================================================================

    /// identity -> delegate -> delegate2
    fn direct_transfers(h: &mut Harness) -> (Receipt, Receipt) {
        let first = h
            .registry
            .change_owner(identity(), delegate(), Claim::direct(identity()))
            .unwrap();
        let second = h
            .registry
            .change_owner(identity(), delegate2(), Claim::direct(delegate()))
            .unwrap();
        (first, second)
    }

    /// signer hands itself to signer2
    fn signed_transfer(h: &mut Harness) -> Receipt {
        let signer = addr(&signer_key());
        let operation = Operation::ChangeOwner {
            new_owner: addr(&signer_key2()),
        };
        let claim = h.signed(signer, &operation, &signer_key());
        h.registry.apply(signer, operation, claim).unwrap()
    }

    fn add_delegate_signed(h: &mut Harness) -> Receipt {
        let signer = addr(&signer_key());
        let operation = Operation::AddDelegate {
            delegate_type: label("attestor"),
            delegate: delegate(),
            validity: DAY,
        };
        let claim = h.signed(signer, &operation, &signer_key2());
        h.registry.apply(signer, operation, claim).unwrap()
    }

    // =========================================================================
    // identityOwner
    // =========================================================================

    #[test]
    fn test_default_owner_is_identity_itself() {
        let h = Harness::new();
        assert_eq!(h.registry.identity_owner(identity2()), identity2());
    }

    #[test]
    fn test_changed_owner_is_returned() {
        let mut h = Harness::new();
        h.registry
            .change_owner(identity2(), delegate(), Claim::direct(identity2()))
            .unwrap();
        assert_eq!(h.registry.identity_owner(identity2()), delegate());
    }

    // =========================================================================
    // changeOwner
    // =========================================================================

    #[test]
    fn test_change_owner_as_current_owner() {
        let mut h = Harness::new();
        let receipt = h
            .registry
            .change_owner(identity(), delegate(), Claim::direct(identity()))
            .unwrap();

        assert_eq!(h.registry.owners(identity()), Some(delegate()));
        assert_eq!(h.registry.changed(identity()), receipt.position);
        assert_eq!(
            receipt.event,
            RegistryEvent::OwnerChanged {
                identity: identity(),
                owner: delegate(),
                previous_change: 0,
            }
        );
    }

    #[test]
    fn test_change_owner_as_new_owner() {
        let mut h = Harness::new();
        let (first, second) = direct_transfers(&mut h);

        assert_eq!(h.registry.owners(identity()), Some(delegate2()));
        assert_eq!(h.registry.changed(identity()), second.position);
        assert_eq!(second.event.previous_change(), first.position);
    }

    #[test]
    fn test_change_owner_as_original_owner_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        assert_bad_actor(
            h.registry
                .change_owner(identity(), identity(), Claim::direct(identity())),
        );
    }

    #[test]
    fn test_change_owner_as_attacker_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        assert_ne!(h.registry.identity_owner(identity()), bad_boy());
        assert_bad_actor(
            h.registry
                .change_owner(identity(), bad_boy(), Claim::direct(bad_boy())),
        );
        assert_eq!(h.registry.identity_owner(identity()), delegate2());
    }

    #[test]
    fn test_change_owner_signed_as_current_owner() {
        let mut h = Harness::new();
        let signer = addr(&signer_key());
        let signer2 = addr(&signer_key2());

        let receipt = signed_transfer(&mut h);

        assert_eq!(h.registry.owners(signer), Some(signer2));
        assert_eq!(h.registry.changed(signer), receipt.position);
        assert_eq!(
            receipt.event,
            RegistryEvent::OwnerChanged {
                identity: signer,
                owner: signer2,
                previous_change: 0,
            }
        );
        assert_eq!(h.registry.nonce(signer), 1);
    }

    #[test]
    fn test_change_owner_signed_as_original_owner_fails() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        let signer = addr(&signer_key());

        let operation = Operation::ChangeOwner { new_owner: signer };
        // signer's own nonce is 1 now, but signer no longer controls the identity
        let claim = h.signed_with_nonce(signer, &operation, &signer_key(), 1);
        assert_bad_signature(h.registry.apply(signer, operation, claim));
    }

    #[test]
    fn test_change_owner_signed_with_wrong_nonce_fails() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        let signer = addr(&signer_key());
        let signer2 = addr(&signer_key2());
        assert_eq!(h.registry.nonce(signer2), 0);

        let operation = Operation::ChangeOwner { new_owner: signer2 };
        let claim = h.signed_with_nonce(signer, &operation, &signer_key2(), 1);
        assert_bad_signature(h.registry.apply(signer, operation, claim));
        assert_eq!(h.registry.nonce(signer2), 0);
    }

    // =========================================================================
    // addDelegate
    // =========================================================================

    #[test]
    fn test_add_delegate_as_current_owner() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        let previous = h.registry.changed(identity());
        assert!(!h
            .registry
            .valid_delegate(identity(), label("attestor"), delegate3()));

        let receipt = h
            .registry
            .add_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();

        assert!(h
            .registry
            .valid_delegate(identity(), label("attestor"), delegate3()));
        assert_eq!(h.registry.changed(identity()), receipt.position);
        assert_eq!(
            receipt.event,
            RegistryEvent::DelegateChanged {
                identity: identity(),
                delegate_type: label("attestor"),
                delegate: delegate3(),
                valid_to: receipt.timestamp + DAY,
                previous_change: previous,
            }
        );
    }

    #[test]
    fn test_add_delegate_as_original_owner_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        assert_bad_actor(h.registry.add_delegate(
            identity(),
            label("attestor"),
            bad_boy(),
            DAY,
            Claim::direct(identity()),
        ));
        assert!(!h
            .registry
            .valid_delegate(identity(), label("attestor"), bad_boy()));
    }

    #[test]
    fn test_add_delegate_as_attacker_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        assert_bad_actor(h.registry.add_delegate(
            identity(),
            label("attestor"),
            bad_boy(),
            DAY,
            Claim::direct(bad_boy()),
        ));
    }

    #[test]
    fn test_add_delegate_signed_as_current_owner() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        let signer = addr(&signer_key());
        let previous = h.registry.changed(signer);

        let receipt = add_delegate_signed(&mut h);

        assert!(h
            .registry
            .valid_delegate(signer, label("attestor"), delegate()));
        assert_eq!(h.registry.changed(signer), receipt.position);
        assert_eq!(receipt.event.previous_change(), previous);
        assert_eq!(receipt.event.valid_to(), Some(receipt.timestamp + DAY));
        assert_eq!(h.registry.nonce(addr(&signer_key2())), 1);
    }

    #[test]
    fn test_add_delegate_signed_as_wrong_owner_fails() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        let signer = addr(&signer_key());
        let operation = Operation::AddDelegate {
            delegate_type: label("attestor"),
            delegate: bad_boy(),
            validity: DAY,
        };
        let claim = h.signed(signer, &operation, &signer_key());
        assert_bad_signature(h.registry.apply(signer, operation, claim));
    }

    #[test]
    fn test_add_delegate_signed_with_wrong_nonce_fails() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        let signer = addr(&signer_key());
        let operation = Operation::AddDelegate {
            delegate_type: label("attestor"),
            delegate: bad_boy(),
            validity: DAY,
        };
        let claim = h.signed_with_nonce(signer, &operation, &signer_key2(), 1);
        assert_bad_signature(h.registry.apply(signer, operation, claim));
    }

    // =========================================================================
    // revokeDelegate
    // =========================================================================

    #[test]
    fn test_revoke_delegate_as_current_owner() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        h.registry
            .add_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();
        let previous = h.registry.changed(identity());
        assert!(h
            .registry
            .valid_delegate(identity(), label("attestor"), delegate3()));

        let receipt = h
            .registry
            .revoke_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                Claim::direct(delegate2()),
            )
            .unwrap();

        assert!(!h
            .registry
            .valid_delegate(identity(), label("attestor"), delegate3()));
        assert_eq!(h.registry.changed(identity()), receipt.position);
        assert_eq!(
            receipt.event,
            RegistryEvent::DelegateChanged {
                identity: identity(),
                delegate_type: label("attestor"),
                delegate: delegate3(),
                valid_to: receipt.timestamp,
                previous_change: previous,
            }
        );
    }

    #[test]
    fn test_revoke_delegate_as_original_owner_or_attacker_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        for caller in [identity(), bad_boy()] {
            assert_bad_actor(h.registry.revoke_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                Claim::direct(caller),
            ));
        }
    }

    #[test]
    fn test_revoke_delegate_signed() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        add_delegate_signed(&mut h);
        let signer = addr(&signer_key());
        let operation = Operation::RevokeDelegate {
            delegate_type: label("attestor"),
            delegate: delegate(),
        };

        // Wrong owner and stale nonce first; neither leaves a trace
        let wrong_owner = h.signed(signer, &operation, &signer_key());
        assert_bad_signature(h.registry.apply(signer, operation.clone(), wrong_owner));
        let stale = h.signed_with_nonce(signer, &operation, &signer_key2(), 0);
        assert_bad_signature(h.registry.apply(signer, operation.clone(), stale));
        assert!(h
            .registry
            .valid_delegate(signer, label("attestor"), delegate()));

        let claim = h.signed(signer, &operation, &signer_key2());
        let receipt = h.registry.apply(signer, operation, claim).unwrap();

        assert!(!h
            .registry
            .valid_delegate(signer, label("attestor"), delegate()));
        assert_eq!(h.registry.changed(signer), receipt.position);
        assert_eq!(h.registry.nonce(addr(&signer_key2())), 2);
    }

    // =========================================================================
    // setAttribute / revokeAttribute
    // =========================================================================

    #[test]
    fn test_set_attribute_as_current_owner() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        let previous = h.registry.changed(identity());

        let receipt = h
            .registry
            .set_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();

        assert_eq!(h.registry.changed(identity()), receipt.position);
        assert_eq!(
            receipt.event,
            RegistryEvent::AttributeChanged {
                identity: identity(),
                name: label("encryptionKey"),
                value: b"mykey".to_vec(),
                valid_to: receipt.timestamp + DAY,
                previous_change: previous,
            }
        );
    }

    #[test]
    fn test_set_attribute_as_original_owner_or_attacker_fails() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        for caller in [identity(), bad_boy()] {
            assert_bad_actor(h.registry.set_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                DAY,
                Claim::direct(caller),
            ));
        }
    }

    #[test]
    fn test_revoke_attribute_as_current_owner() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        h.registry
            .set_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();
        let previous = h.registry.changed(identity());

        let receipt = h
            .registry
            .revoke_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                Claim::direct(delegate2()),
            )
            .unwrap();

        assert_eq!(
            receipt.event,
            RegistryEvent::AttributeChanged {
                identity: identity(),
                name: label("encryptionKey"),
                value: b"mykey".to_vec(),
                valid_to: 0,
                previous_change: previous,
            }
        );
        for caller in [identity(), bad_boy()] {
            assert_bad_actor(h.registry.revoke_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                Claim::direct(caller),
            ));
        }
    }

    #[test]
    fn test_attributes_signed_consume_nonces_in_order() {
        let mut h = Harness::new();
        signed_transfer(&mut h);
        add_delegate_signed(&mut h);
        let signer = addr(&signer_key());
        let signer2 = addr(&signer_key2());

        let revoke_delegate = Operation::RevokeDelegate {
            delegate_type: label("attestor"),
            delegate: delegate(),
        };
        let set = Operation::SetAttribute {
            name: label("encryptionKey"),
            value: b"mykey".to_vec(),
            validity: DAY,
        };
        let revoke = Operation::RevokeAttribute {
            name: label("encryptionKey"),
            value: b"mykey".to_vec(),
        };

        for operation in [revoke_delegate, set, revoke.clone()] {
            let claim = h.signed(signer, &operation, &signer_key2());
            h.registry.apply(signer, operation, claim).unwrap();
        }
        assert_eq!(h.registry.nonce(signer2), 4);

        let wrong_owner = h.signed(signer, &revoke, &signer_key());
        assert_bad_signature(h.registry.apply(signer, revoke.clone(), wrong_owner));
        let wrong_nonce = h.signed_with_nonce(signer, &revoke, &signer_key2(), 1);
        assert_bad_signature(h.registry.apply(signer, revoke, wrong_nonce));
        assert_eq!(h.registry.nonce(signer2), 4);
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn test_events_can_create_list() {
        let mut h = Harness::new();
        direct_transfers(&mut h);
        h.registry
            .add_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();
        h.registry
            .revoke_delegate(
                identity(),
                label("attestor"),
                delegate3(),
                Claim::direct(delegate2()),
            )
            .unwrap();
        h.registry
            .set_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                DAY,
                Claim::direct(delegate2()),
            )
            .unwrap();
        h.registry
            .revoke_attribute(
                identity(),
                label("encryptionKey"),
                b"mykey".to_vec(),
                Claim::direct(delegate2()),
            )
            .unwrap();
        // Noise on another identity must not leak into the list
        h.registry
            .change_owner(identity2(), delegate(), Claim::direct(identity2()))
            .unwrap();

        let mut names: Vec<_> = h
            .registry
            .history(identity())
            .unwrap()
            .iter()
            .map(|e| e.kind())
            .collect();
        names.reverse();

        assert_eq!(
            names,
            vec![
                "OwnerChanged",
                "OwnerChanged",
                "DelegateChanged",
                "DelegateChanged",
                "AttributeChanged",
                "AttributeChanged",
            ]
        );
    }
}
