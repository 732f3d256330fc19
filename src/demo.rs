//! Interactive driver, reads keys from a stream and prints the tree.

use std::io::{self, BufRead, Write};

use log::warn;

use crate::rbtree::RbTree;

/// Read non-negative integers from `input`, insert them into a fresh
/// tree and print the tree to `output` in-order and level-order. Input
/// ends at the first negative value, at EOF, or at a token that is not
/// an integer.
pub fn simulate<R, W>(input: R, mut output: W) -> io::Result<RbTree<i64>>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Red-Black tree simulation.")?;
    writeln!(output, "Enter unique non-negative numbers, one per line.")?;
    writeln!(output, "Enter -1 to finish.")?;
    output.flush()?;

    let mut tree = RbTree::new("simulation");
    for key in read_keys(input)? {
        tree.insert(key);
    }

    writeln!(output, "In order:")?;
    writeln!(output, "{}", in_order_line(&tree))?;
    writeln!(output, "Level order (R/B colors):")?;
    writeln!(output, "{}", level_order_line(&tree))?;
    output.flush()?;
    Ok(tree)
}

/// Format keys in ascending order, tab separated.
pub fn in_order_line(tree: &RbTree<i64>) -> String {
    let keys: Vec<String> = tree.iter().map(|key| key.to_string()).collect();
    keys.join("\t")
}

/// Format keys level by level, each annotated with its color, tab
/// separated.
pub fn level_order_line(tree: &RbTree<i64>) -> String {
    let keys: Vec<String> = tree
        .level_order()
        .map(|(key, color)| format!("{}({})", key, color))
        .collect();
    keys.join("\t")
}

fn read_keys<R: BufRead>(input: R) -> io::Result<Vec<i64>> {
    let mut keys = vec![];
    for line in input.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            match token.parse::<i64>() {
                Ok(key) if key < 0 => return Ok(keys),
                Ok(key) => keys.push(key),
                Err(err) => {
                    warn!("stop reading at {:?}: {}", token, err);
                    return Ok(keys);
                }
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate() {
        let input = "10\n20\n30\n20\n-1\n40\n".as_bytes();
        let mut output: Vec<u8> = vec![];
        let tree = simulate(input, &mut output).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&40));

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[4], "10\t20\t30");
        assert_eq!(lines[6], "20(B)\t10(R)\t30(R)");
    }

    #[test]
    fn test_simulate_tokens() {
        let input = "1 2 3\n4 5 6 7 -1".as_bytes();
        let mut output: Vec<u8> = vec![];
        let tree = simulate(input, &mut output).unwrap();
        assert_eq!(in_order_line(&tree), "1\t2\t3\t4\t5\t6\t7");
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_simulate_empty() {
        let mut output: Vec<u8> = vec![];
        let tree = simulate("-1\n".as_bytes(), &mut output).unwrap();
        assert!(tree.is_empty());
        assert_eq!(level_order_line(&tree), "");
    }

    #[test]
    fn test_read_keys_stops() {
        assert_eq!(read_keys("3 x 4".as_bytes()).unwrap(), vec![3]);
        assert_eq!(read_keys("3\n\n4".as_bytes()).unwrap(), vec![3, 4]);
        assert_eq!(read_keys("5 -7 6".as_bytes()).unwrap(), vec![5]);
    }
}
