//! Basic usage example for `ObjectPool`.
//!
//! This example shows objects being carved from slab blocks, recycled via the free list and
//! allocated standalone once the pool runs out of slab capacity.

use memkit::ObjectPool;

fn main() {
    // A pool that carves up to 3 buffers from its slab blocks.
    let mut pool = ObjectPool::<Vec<u8>>::new(3);

    let layout = pool.layout();
    println!(
        "Created pool with capacity {}: stride {} bytes, {} objects per {}-byte block",
        pool.capacity(),
        layout.stride(),
        layout.objects_per_block(),
        layout.block_size()
    );

    let mut buffers: Vec<_> = (0..4).map(|_| pool.get()).collect();

    for (i, buffer) in buffers.iter_mut().enumerate() {
        pool.object_mut(buffer).extend_from_slice(format!("buffer {i}").as_bytes());
        println!("Got {:?}", buffer.origin());
    }

    println!(
        "Issued {} slab objects from {} block(s)",
        pool.issued(),
        pool.allocated_blocks()
    );

    // Return everything. Slab objects go onto the free list, the standalone one is freed.
    for buffer in buffers.drain(..) {
        pool.put(buffer);
    }

    println!("{} objects are waiting for reuse", pool.free_count());

    // The most recently returned slab object comes back first, contents intact.
    let recycled = pool.get();
    println!(
        "Recycled {:?} containing {:?}",
        recycled.origin(),
        String::from_utf8_lossy(pool.object(&recycled))
    );

    pool.put(recycled);
}
