//! Basic usage example for `Array`, `SortedArray` and `Stack`.
//!
//! This example shows an array moving between inline and heap storage as it grows and shrinks,
//! a sorted array keeping its order and a stack growing as items are pushed.

use memkit::{Array, SortedArray, Stack};

fn main() {
    let mut array = Array::<u32, 4>::new();

    for i in 0..20 {
        array.push(i);

        if i % 4 == 0 {
            println!(
                "After pushing {i}: {} items, capacity {}, inline: {}",
                array.len(),
                array.capacity(),
                array.is_inline()
            );
        }
    }

    while array.len() > 1 {
        array.pop();

        println!(
            "After popping: {} items, capacity {}, inline: {}",
            array.len(),
            array.capacity(),
            array.is_inline()
        );
    }

    let mut words = SortedArray::<&str, _>::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));

    for word in ["banana", "fig", "cherry", "kiwi", "apple"] {
        words.put(word);
    }

    println!("Words by length: {:?}", words.as_slice());
    println!("Removed a 4-letter word: {:?}", words.erase(&"____"));
    println!("Remaining: {:?}", words.as_slice());

    let mut stack = Stack::with_capacity(2);

    for i in 0..10 {
        stack.push(i);
    }

    println!(
        "Stack holds {} items with capacity {}, top is {:?}",
        stack.len(),
        stack.capacity(),
        stack.top()
    );

    while let Some(value) = stack.pop() {
        print!("{value} ");
    }

    println!();
}
