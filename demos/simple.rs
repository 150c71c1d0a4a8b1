//! Simple standalone example of RGA CRDT usage.
//!
//! This example demonstrates the basic functionality of the RGA CRDT
//! in a simple, easy-to-understand scenario.
//!
//! Run with: cargo run --example simple

use collab_rga::edit::apply_text;
use collab_rga::{Operation, RGA};

fn main() {
    println!("=== Simple RGA CRDT Example ===\n");

    // Create two replicas representing two users
    let mut alice = RGA::new(1);
    let mut bob = RGA::new(2);

    println!("Alice (replica 1) and Bob (replica 2) start editing a document\n");

    // Alice types "Hello"
    println!("Alice types 'Hello':");
    let alice_ops = apply_text(&mut alice, "Hello");
    println!("  Alice's document: '{}'", alice);

    // Bob concurrently types "World!" into his empty copy
    println!("\nBob concurrently types 'World!' (also from the start):");
    let bob_ops = apply_text(&mut bob, "World!");
    println!("  Bob's document: '{}'", bob);

    // Synchronize, delivering Bob's operations backwards to show buffering
    println!("\n--- Synchronizing Changes ---");
    println!("Alice receives Bob's changes in reverse order...");
    for op in bob_ops.iter().rev() {
        alice.apply(op.clone());
        println!(
            "  applied {:?}, waiting: {}, text: '{}'",
            op.id(),
            alice.pending_inserts(),
            alice
        );
    }

    println!("Bob receives Alice's changes...");
    for op in &alice_ops {
        bob.apply(op.clone());
    }

    println!("\n--- After Synchronization ---");
    println!("  Alice sees: '{}'", alice);
    println!("  Bob sees:   '{}'", bob);

    // Verify convergence
    if alice.materialize() == bob.materialize() {
        println!("\n✓ SUCCESS: Both users converged to the same document!");
    } else {
        println!("\n✗ ERROR: Documents did not converge!");
    }

    // Show the ordering details
    println!("\n--- Technical Details ---");
    for element in alice.elements() {
        println!(
            "  {} after {:<6} '{}'{}",
            element.id,
            element.origin.map_or("start".to_string(), |o| o.to_string()),
            element.value,
            if element.visible { "" } else { " (deleted)" }
        );
    }

    // Demonstrate deletion
    println!("\n=== Deletion Example ===");
    println!("Alice deletes the '!'");
    let without_bang = alice.materialize().replace('!', "");
    let edits = apply_text(&mut alice, &without_bang);
    for op in edits {
        if let Operation::Delete(id) = op {
            bob.delete(id);
        }
    }
    println!("  Alice's document: '{}'", alice);
    println!("  Bob's document:   '{}'", bob);

    println!("\n=== Example Complete ===");
}
