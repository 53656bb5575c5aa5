use criterion::{black_box, criterion_group, criterion_main, Criterion};

use studybuddy_core::grading::{grade, Answers};
use studybuddy_core::model::ValidQuestion;

fn make_quiz(n: usize) -> (Vec<ValidQuestion>, Answers) {
    let questions: Vec<ValidQuestion> = (0..n)
        .map(|i| ValidQuestion {
            question: format!("Question {i}?"),
            options: (0..4).map(|o| format!("option {i}.{o}")).collect(),
            correct_answer: i % 4,
            explanation: None,
        })
        .collect();

    // Every third question left blank, the rest alternate right and wrong
    let answers: Answers = questions
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(i, q)| {
            let pick = if i % 2 == 0 {
                q.correct_answer
            } else {
                (q.correct_answer + 1) % 4
            };
            (i, q.options[pick].clone())
        })
        .collect();

    (questions, answers)
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");

    for n in [10, 100, 1000] {
        let (questions, answers) = make_quiz(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| grade(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_score_fraction(c: &mut Criterion) {
    let (questions, answers) = make_quiz(100);
    let score = grade(&questions, &answers);

    c.bench_function("score_fraction", |b| b.iter(|| black_box(&score).fraction()));
}

criterion_group!(benches, bench_grade, bench_score_fraction);
criterion_main!(benches);
