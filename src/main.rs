// model = "claude-opus-4-5"
// created = "2026-02-15"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! Scratch demo: two replicas editing concurrently, then converging.

use weft::crdt::delta::DeltaRecord;
use weft::crdt::doc::Doc;
use weft::crdt::query::CharRef;

fn main() {
    let mut alice = Doc::new("alice");
    let mut bob = Doc::new("bob");

    // Alice seeds the document and syncs it over.
    let seed = alice.set("hello world", None).unwrap();
    for (spec, op) in &seed {
        bob.apply(spec, op).unwrap();
    }

    // Concurrently: Alice styles the greeting via a delta (as her OT
    // editor would), Bob appends at the end.
    let from_alice = alice
        .apply_delta(&[
            DeltaRecord::delete(5),
            DeltaRecord::insert_attrs(
                "HELLO",
                [("bold".to_string(), serde_json::json!(true))].into_iter().collect(),
            ),
        ])
        .unwrap();
    let from_bob = bob.insert_chars_at(CharRef::Eof, "!", None).unwrap();

    // Exchange.
    for (spec, op) in &from_alice {
        bob.apply(spec, op).unwrap();
    }
    alice.apply(&from_bob.0, &from_bob.1).unwrap();

    println!("alice: {:?}", alice.text());
    println!("bob:   {:?}", bob.text());
    assert_eq!(alice.text(), bob.text());

    println!("atoms: {}", alice.len());
    for atom in alice.weave().atoms().iter().skip(1) {
        let tombstones = atom.deleted_ids().count();
        println!(
            "  {} {:?} attrs={:?} tombstones={}",
            atom.id(),
            atom.ch().unwrap_or(' '),
            atom.attrs().map(|a| a.keys().collect::<Vec<_>>()),
            tombstones,
        );
    }
}
