use serde::Serialize;

/// The only language available without a pro subscription.
pub const FREE_LANGUAGE: &str = "javascript";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Runtime {
    pub language: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub runtime: Runtime,
    pub default_code: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

pub const DEFAULT_THEME: &str = "vs-dark";

pub static THEMES: &[Theme] = &[
    Theme { id: "vs-dark", label: "VS Dark", color: "#1e1e1e" },
    Theme { id: "vs-light", label: "VS Light", color: "#ffffff" },
    Theme { id: "github-dark", label: "GitHub Dark", color: "#0d1117" },
    Theme { id: "monokai", label: "Monokai", color: "#272822" },
    Theme { id: "solarized-dark", label: "Solarized Dark", color: "#002b36" },
];

pub static LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        id: "javascript",
        label: "JavaScript",
        runtime: Runtime { language: "javascript", version: "18.15.0" },
        default_code: r#"// JavaScript playground
const numbers = [1, 2, 3, 4, 5];

const squares = numbers.map(n => n * n);
console.log('Numbers:', numbers);
console.log('Squares:', squares);

const sum = numbers.reduce((acc, n) => acc + n, 0);
console.log('Sum:', sum);"#,
    },
    LanguageConfig {
        id: "typescript",
        label: "TypeScript",
        runtime: Runtime { language: "typescript", version: "5.0.3" },
        default_code: r#"// TypeScript playground
const numbers: number[] = [1, 2, 3, 4, 5];

const squares = numbers.map((n: number): number => n * n);
console.log('Numbers:', numbers);
console.log('Squares:', squares);

const sum = numbers.reduce((acc: number, n: number) => acc + n, 0);
console.log('Sum:', sum);"#,
    },
    LanguageConfig {
        id: "python",
        label: "Python",
        runtime: Runtime { language: "python", version: "3.10.0" },
        default_code: r#"# Python playground
numbers = [1, 2, 3, 4, 5]

squares = [n ** 2 for n in numbers]
print(f"Numbers: {numbers}")
print(f"Squares: {squares}")
print(f"Sum: {sum(numbers)}")"#,
    },
    LanguageConfig {
        id: "java",
        label: "Java",
        runtime: Runtime { language: "java", version: "15.0.2" },
        default_code: r#"public class Main {
    public static void main(String[] args) {
        int[] numbers = {1, 2, 3, 4, 5};
        int sum = 0;
        for (int n : numbers) {
            System.out.println(n + " squared is " + (n * n));
            sum += n;
        }
        System.out.println("Sum: " + sum);
    }
}"#,
    },
    LanguageConfig {
        id: "go",
        label: "Go",
        runtime: Runtime { language: "go", version: "1.16.2" },
        default_code: r#"package main

import "fmt"

func main() {
	numbers := []int{1, 2, 3, 4, 5}
	sum := 0
	for _, n := range numbers {
		fmt.Printf("%d squared is %d\n", n, n*n)
		sum += n
	}
	fmt.Println("Sum:", sum)
}"#,
    },
    LanguageConfig {
        id: "rust",
        label: "Rust",
        runtime: Runtime { language: "rust", version: "1.68.2" },
        default_code: r#"fn main() {
    let numbers = vec![1, 2, 3, 4, 5];

    let squares: Vec<i32> = numbers.iter().map(|n| n * n).collect();
    println!("Numbers: {:?}", numbers);
    println!("Squares: {:?}", squares);
    println!("Sum: {}", numbers.iter().sum::<i32>());
}"#,
    },
    LanguageConfig {
        id: "cpp",
        label: "C++",
        runtime: Runtime { language: "cpp", version: "10.2.0" },
        default_code: r#"#include <iostream>
#include <vector>

int main() {
    std::vector<int> numbers = {1, 2, 3, 4, 5};
    int sum = 0;
    for (int n : numbers) {
        std::cout << n << " squared is " << n * n << std::endl;
        sum += n;
    }
    std::cout << "Sum: " << sum << std::endl;
    return 0;
}"#,
    },
    LanguageConfig {
        id: "csharp",
        label: "C#",
        runtime: Runtime { language: "csharp", version: "6.12.0" },
        default_code: r#"using System;
using System.Linq;

class Program {
    static void Main() {
        var numbers = new[] { 1, 2, 3, 4, 5 };
        var squares = numbers.Select(n => n * n);
        Console.WriteLine($"Numbers: {string.Join(", ", numbers)}");
        Console.WriteLine($"Squares: {string.Join(", ", squares)}");
        Console.WriteLine($"Sum: {numbers.Sum()}");
    }
}"#,
    },
    LanguageConfig {
        id: "ruby",
        label: "Ruby",
        runtime: Runtime { language: "ruby", version: "3.0.1" },
        default_code: r##"numbers = [1, 2, 3, 4, 5]

squares = numbers.map { |n| n * n }
puts "Numbers: #{numbers.join(', ')}"
puts "Squares: #{squares.join(', ')}"
puts "Sum: #{numbers.sum}""##,
    },
    LanguageConfig {
        id: "swift",
        label: "Swift",
        runtime: Runtime { language: "swift", version: "5.3.3" },
        default_code: r#"let numbers = [1, 2, 3, 4, 5]

let squares = numbers.map { $0 * $0 }
print("Numbers: \(numbers)")
print("Squares: \(squares)")
print("Sum: \(numbers.reduce(0, +))")"#,
    },
];

pub fn find_language(id: &str) -> Option<&'static LanguageConfig> {
    LANGUAGES.iter().find(|lang| lang.id == id)
}

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_language_is_in_the_table() {
        assert!(find_language(FREE_LANGUAGE).is_some());
        assert!(find_theme(DEFAULT_THEME).is_some());
    }

    #[test]
    fn ids_are_unique_and_match_runtimes() {
        for (i, lang) in LANGUAGES.iter().enumerate() {
            assert!(LANGUAGES[i + 1..].iter().all(|other| other.id != lang.id));
            assert!(!lang.default_code.is_empty());
            assert!(!lang.runtime.version.is_empty());
        }
        assert_eq!(find_language("python").map(|l| l.runtime.version), Some("3.10.0"));
        assert!(find_language("cobol").is_none());
    }
}
